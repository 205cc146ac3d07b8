//! Authentication route handlers for login, signup, and logout.

use axum::{
    extract::{Form, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::ServerError;
use crate::state::AppState;
use super::discussion_handlers::DISCUSSIONS_PATH;
use super::utils::{flash_from_query, get_session_token, page_context, render_template};

/// Login form data
#[derive(serde::Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Signup form data
#[derive(serde::Deserialize)]
pub struct SignupForm {
    pub username: String,
    pub password: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
}

fn see_other_with_cookie(location: &str, cookie: String) -> Response {
    (
        StatusCode::SEE_OTHER,
        [(header::LOCATION, location.to_string()), (header::SET_COOKIE, cookie)],
    )
        .into_response()
}

/// Validate signup input, returning the notice code on failure
fn validate_signup(form: &SignupForm) -> Result<(), &'static str> {
    if form.username.len() < 2 {
        return Err("username_too_short");
    }
    if form.password.len() < 4 {
        return Err("password_too_short");
    }
    if !form
        .username
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err("username_invalid");
    }
    Ok(())
}

/// Login page (GET)
pub async fn login_page(Query(query): Query<HashMap<String, String>>) -> Response {
    let mut context = page_context("login", "Sign In", None);
    context.insert("error", &flash_from_query(&query, "error"));
    context.insert("message", &flash_from_query(&query, "message"));
    render_template("login.html", &context)
}

/// Login submit (POST)
pub async fn login_submit(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> Response {
    match state.auth.authenticate(&form.username, &form.password).await {
        Ok(session) => see_other_with_cookie(
            DISCUSSIONS_PATH,
            format!("token={}; Path=/; HttpOnly; SameSite=Lax", session.token),
        ),
        Err(e) => {
            tracing::debug!("Login failed for {}: {}", form.username, e);
            Redirect::to("/login?error=bad_credentials").into_response()
        }
    }
}

/// Signup page (GET)
pub async fn signup_page(Query(query): Query<HashMap<String, String>>) -> Response {
    let mut context = page_context("signup", "Create Account", None);
    context.insert("error", &flash_from_query(&query, "error"));
    render_template("signup.html", &context)
}

/// Signup submit (POST)
pub async fn signup_submit(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SignupForm>,
) -> Response {
    if let Err(code) = validate_signup(&form) {
        return Redirect::to(&format!("/signup?error={}", code)).into_response();
    }

    match state
        .auth
        .register_user(
            &form.username,
            &form.password,
            form.display_name.as_deref(),
            form.email.as_deref(),
        )
        .await
    {
        Ok(_) => Redirect::to("/login?message=account_created").into_response(),
        Err(ServerError::UserExists(_)) => {
            Redirect::to("/signup?error=username_taken").into_response()
        }
        Err(e) => {
            tracing::error!("Signup failed for {}: {}", form.username, e);
            Redirect::to("/signup?error=signup_failed").into_response()
        }
    }
}

/// Logout (GET)
pub async fn logout(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if let Some(token) = get_session_token(&headers) {
        state.auth.revoke_token(&token);
    }
    see_other_with_cookie(
        DISCUSSIONS_PATH,
        "token=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0".to_string(),
    )
}
