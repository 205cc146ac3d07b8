mod auth;
mod config;
mod db;
mod error;
mod state;
mod web_ui;

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::ServerConfig;
use state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "discussion_board=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();
    tracing::debug!("Configuration: {:?}", config);

    let state = Arc::new(AppState::new(&config).await?);

    // Ensure default admin user exists (for bootstrapping)
    state
        .auth
        .ensure_admin_user("admin", &config.admin_password)
        .await?;

    let app = Router::new()
        .merge(web_ui::router())
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    tracing::info!("Discussion board starting on http://{}", config.bind_addr);
    tracing::info!("Discussions: http://{}/discussions", config.bind_addr);
    tracing::info!("Default account: admin (password from DISCUSSION_BOARD_ADMIN_PASSWORD)");

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
