//! Shared application state handed to every handler.

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::auth::AuthManager;
use crate::config::ServerConfig;
use crate::db::{self, DiscussionStore};
use crate::error::Result;

pub struct AppState {
    pub discussions: DiscussionStore,
    pub auth: AuthManager,
}

impl AppState {
    /// Open the database named by `config` and build state around it
    pub async fn new(config: &ServerConfig) -> Result<Self> {
        let db = db::init_database(&config.db_path).await?;
        tracing::info!("Database initialized at {:?}", config.db_path);
        Ok(Self::with_db(config, Arc::new(db)))
    }

    pub fn with_db(config: &ServerConfig, db: Arc<DatabaseConnection>) -> Self {
        Self {
            discussions: DiscussionStore::new(db.clone()),
            auth: AuthManager::new(db, config.session_duration),
        }
    }
}

#[cfg(test)]
pub mod test_support {
    use super::*;
    use crate::db::entities::user;
    use tempfile::TempDir;

    /// State backed by a throwaway database, plus one registered user
    pub async fn state_with_user() -> (TempDir, AppState, user::Model) {
        let temp_dir = TempDir::new().unwrap();
        let config = ServerConfig {
            db_path: temp_dir.path().join("board.db"),
            ..Default::default()
        };
        let state = AppState::new(&config).await.unwrap();
        let user = state
            .auth
            .register_user("alice", "password", None, None)
            .await
            .unwrap();
        (temp_dir, state, user)
    }
}
