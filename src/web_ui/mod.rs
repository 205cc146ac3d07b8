//! Web UI Module
//!
//! Server-rendered pages for the discussion board. Every route runs a
//! chain of steps (see `routes::chain`) and answers with HTML or a
//! redirect.

mod routes;
pub mod templates;

use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

/// Create the web UI router.
/// Mount this with `.merge(web_ui::router())` in main.rs
pub fn router() -> Router<Arc<AppState>> {
    routes::create_router()
}
