use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use tera::Context;
use thiserror::Error;

use crate::web_ui::templates;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("Invalid username or password")]
    AuthFailed,

    #[error("Username already taken: {0}")]
    UserExists(String),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Validation(_) => StatusCode::BAD_REQUEST,
            ServerError::AuthFailed => StatusCode::UNAUTHORIZED,
            ServerError::UserExists(_) => StatusCode::CONFLICT,
            ServerError::Database(_) | ServerError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Central error page. Server-side failures are logged here and shown
/// to the user without detail.
impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
            "Something went wrong. Please try again later.".to_string()
        } else {
            self.to_string()
        };

        let heading = match status {
            StatusCode::NOT_FOUND => "Not Found",
            _ => status.canonical_reason().unwrap_or("Error"),
        };

        let mut context = Context::new();
        context.insert("page", "error");
        context.insert("title", heading);
        context.insert("status", &status.as_u16());
        context.insert("message", &message);
        context.insert("current_user", &None::<String>);

        match templates::render("error.html", &context) {
            Ok(html) => (status, Html(html)).into_response(),
            Err(_) => (status, message).into_response(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;
