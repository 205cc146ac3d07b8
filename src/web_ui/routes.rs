//! Web UI route table.

mod auth_handlers;
mod chain;
mod discussion_handlers;
mod utils;

use axum::{
    response::Redirect,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::state::AppState;
use auth_handlers::{login_page, login_submit, logout, signup_page, signup_submit};
use discussion_handlers::{
    create_discussion, delete_discussion, discussion_detail, edit_discussion_page,
    list_discussions, new_discussion_page, update_discussion, DISCUSSIONS_PATH,
};

async fn health() -> &'static str {
    "OK"
}

/// Create the web UI router
pub fn create_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        .route("/", get(|| async { Redirect::to(DISCUSSIONS_PATH) }))
        .route("/discussions", get(list_discussions).post(create_discussion))
        .route("/discussions/new", get(new_discussion_page))
        .route("/discussions/create", post(create_discussion))
        .route(
            "/discussions/:id",
            get(discussion_detail)
                .put(update_discussion)
                .delete(delete_discussion),
        )
        .route("/discussions/:id/edit", get(edit_discussion_page))
        .route("/discussions/:id/update", post(update_discussion))
        .route("/discussions/:id/delete", post(delete_discussion))
        // Sessions
        .route("/login", get(login_page).post(login_submit))
        .route("/signup", get(signup_page).post(signup_submit))
        .route("/logout", get(logout))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::state_with_user;
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
        response::Response,
    };
    use tower::ServiceExt;

    const FORM: &str = "application/x-www-form-urlencoded";

    async fn send(app: &Router, request: Request<Body>) -> Response {
        app.clone().oneshot(request).await.unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn form_request(method: Method, uri: &str, cookie: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, FORM)
            .header(header::COOKIE, cookie)
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn location(response: &Response) -> &str {
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    /// Router over a fresh database, plus a session cookie for "alice"
    async fn app() -> (tempfile::TempDir, Arc<AppState>, Router, String) {
        let (dir, state, _alice) = state_with_user().await;
        let session = state.auth.authenticate("alice", "password").await.unwrap();
        let state = Arc::new(state);
        let app = create_router().with_state(state.clone());
        (dir, state, app, format!("token={}", session.token))
    }

    #[tokio::test]
    async fn test_health_and_root_redirect() {
        let (_dir, _state, app, _cookie) = app().await;

        let response = send(&app, get_request("/health")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "OK");

        let response = send(&app, get_request("/")).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/discussions");
    }

    #[tokio::test]
    async fn test_new_discussion_page() {
        let (_dir, _state, app, _cookie) = app().await;

        let response = send(&app, get_request("/discussions/new")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_string(response).await.contains("New Discussion"));
    }

    #[tokio::test]
    async fn test_discussion_lifecycle_over_http() {
        let (_dir, state, app, cookie) = app().await;

        let response = send(
            &app,
            form_request(
                Method::POST,
                "/discussions",
                &cookie,
                "title=T&description=D&category=general&tags=a%2C+b",
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/discussions");

        let response = send(&app, get_request("/discussions/1")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_string(response).await.contains("1 views"));

        let response = send(
            &app,
            form_request(Method::PUT, "/discussions/1", &cookie, "title=T2"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/discussions/1");

        let stored = state.discussions.find_by_id(1, false).await.unwrap().unwrap();
        assert_eq!(stored.discussion.title, "T2");
        assert_eq!(stored.discussion.description, "D");
        assert_eq!(stored.discussion.tags.0, vec!["a", "b"]);

        let response = send(
            &app,
            form_request(Method::DELETE, "/discussions/1", &cookie, ""),
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/discussions");

        let response = send(&app, get_request("/discussions/1")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_form_posts_for_update_and_delete() {
        let (_dir, state, app, cookie) = app().await;

        send(
            &app,
            form_request(
                Method::POST,
                "/discussions/create",
                &cookie,
                "title=T&description=D",
            ),
        )
        .await;

        let response = send(
            &app,
            form_request(Method::POST, "/discussions/1/update", &cookie, "category=news"),
        )
        .await;
        assert_eq!(location(&response), "/discussions/1");
        let stored = state.discussions.find_by_id(1, false).await.unwrap().unwrap();
        assert_eq!(stored.discussion.category, "news");

        let response = send(
            &app,
            form_request(Method::POST, "/discussions/1/delete", &cookie, ""),
        )
        .await;
        assert_eq!(location(&response), "/discussions");
        assert!(state.discussions.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_anonymous_writes_are_sent_to_login() {
        let (_dir, state, app, cookie) = app().await;
        send(
            &app,
            form_request(Method::POST, "/discussions", &cookie, "title=T&description=D"),
        )
        .await;

        for (method, body) in [(Method::PUT, "title=X"), (Method::DELETE, "")] {
            let response = send(&app, form_request(method, "/discussions/1", "", body)).await;
            assert_eq!(response.status(), StatusCode::SEE_OTHER);
            assert_eq!(location(&response), "/login?error=login_required");
        }

        let stored = state.discussions.find_by_id(1, false).await.unwrap().unwrap();
        assert_eq!(stored.discussion.title, "T");
    }
}
