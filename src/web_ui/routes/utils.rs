//! Shared utilities and helper functions for web UI.

use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use tera::Context;

use crate::db::entities::user;
use crate::state::AppState;
use crate::web_ui::templates;

/// Helper to render a template
pub fn render_template(name: &str, context: &Context) -> Response {
    match templates::render(name, context) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("Template error: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Template error: {}", e)).into_response()
        }
    }
}

/// Context every page starts from: the `page` and `title` labels plus
/// the signed-in username for the header
pub fn page_context(page: &str, title: &str, current_user: Option<&user::Model>) -> Context {
    let mut context = Context::new();
    context.insert("page", page);
    context.insert("title", title);
    context.insert("current_user", &current_user.map(|u| u.username.as_str()));
    context
}

/// Extract the session token from the `token` cookie
pub fn get_session_token(headers: &HeaderMap) -> Option<String> {
    let cookie_header = headers.get("cookie")?.to_str().ok()?;
    cookie_header
        .split(';')
        .filter_map(|part| part.trim().strip_prefix("token="))
        .find(|token| !token.is_empty())
        .map(str::to_string)
}

/// Resolve the signed-in user from the request cookies
pub async fn get_current_user(state: &AppState, headers: &HeaderMap) -> Option<user::Model> {
    let token = get_session_token(headers)?;
    state.auth.user_for_token(&token).await
}

/// Format seconds ago as human-readable string
pub fn format_time_ago(seconds: i64) -> String {
    if seconds < 0 {
        return "in the future".to_string();
    }
    if seconds < 60 {
        return "just now".to_string();
    }
    let minutes = seconds / 60;
    if minutes < 60 {
        return format!("{} minute{} ago", minutes, if minutes == 1 { "" } else { "s" });
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("{} hour{} ago", hours, if hours == 1 { "" } else { "s" });
    }
    let days = hours / 24;
    if days < 30 {
        return format!("{} day{} ago", days, if days == 1 { "" } else { "s" });
    }
    let months = days / 30;
    if months < 12 {
        return format!("{} month{} ago", months, if months == 1 { "" } else { "s" });
    }
    let years = months / 12;
    format!("{} year{} ago", years, if years == 1 { "" } else { "s" })
}

/// Format a Unix timestamp as a relative time string
pub fn format_relative_time(timestamp: i64) -> String {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0);
    format_time_ago(now - timestamp)
}

/// Notices a redirect can ask a page to show, keyed by the `error` or
/// `message` query value. Unknown codes show nothing, so the query string
/// can never put arbitrary text on a page.
pub fn flash_message(code: &str) -> Option<&'static str> {
    let message = match code {
        "delete_failed" => "The discussion could not be deleted. Please try again.",
        "login_required" => "Please sign in to continue.",
        "bad_credentials" => "Invalid username or password",
        "account_created" => "Account created! Please sign in.",
        "username_too_short" => "Username must be at least 2 characters",
        "password_too_short" => "Password must be at least 4 characters",
        "username_invalid" => "Username can only contain letters, numbers, dashes, and underscores",
        "username_taken" => "That username is already taken",
        "signup_failed" => "The account could not be created. Please try again.",
        _ => return None,
    };
    Some(message)
}

/// Look up the notice for a query parameter, if any
pub fn flash_from_query(
    query: &std::collections::HashMap<String, String>,
    key: &str,
) -> Option<&'static str> {
    query.get(key).and_then(|code| flash_message(code))
}
