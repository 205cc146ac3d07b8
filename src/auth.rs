//! Accounts and cookie sessions.
//!
//! Supplies the acting user to the discussion handlers. Users live in the
//! database; session tokens are held in memory and vanish on restart.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD as BASE64, Engine};
use parking_lot::RwLock;
use rand::{rngs::OsRng, RngCore};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::db::entities::user;
use crate::error::{Result, ServerError};

/// Salt size for Argon2 (128 bits)
const SALT_SIZE: usize = 16;

/// Random bytes per session token (32 base64 chars)
const TOKEN_SIZE: usize = 24;

/// Hash a password with Argon2id and a fresh random salt, in PHC string form
fn hash_password(password: &str) -> Result<String> {
    let mut salt = [0u8; SALT_SIZE];
    OsRng.fill_bytes(&mut salt);

    let salt_string = SaltString::encode_b64(&salt)
        .map_err(|e| ServerError::Internal(format!("Invalid salt: {}", e)))?;

    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt_string)
        .map_err(|e| ServerError::Internal(format!("Password hashing failed: {}", e)))?;

    Ok(password_hash.to_string())
}

/// Check a password against a stored PHC hash. Malformed hashes never match.
fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Generate a session token from the OS random number generator
fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_SIZE];
    OsRng.fill_bytes(&mut bytes);
    BASE64.encode(bytes)
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// A logged-in session
#[derive(Clone, Debug)]
pub struct Session {
    pub token: String,
    pub user_id: i32,
    pub expires_at: SystemTime,
}

impl Session {
    fn new(user_id: i32, duration: Duration) -> Self {
        Self {
            token: generate_token(),
            user_id,
            expires_at: SystemTime::now() + duration,
        }
    }

    pub fn is_expired(&self) -> bool {
        SystemTime::now() >= self.expires_at
    }
}

/// Authentication manager
pub struct AuthManager {
    db: Arc<DatabaseConnection>,
    sessions: RwLock<HashMap<String, Session>>,
    session_duration: Duration,
}

impl AuthManager {
    pub fn new(db: Arc<DatabaseConnection>, session_duration: Duration) -> Self {
        Self {
            db,
            sessions: RwLock::new(HashMap::new()),
            session_duration,
        }
    }

    async fn find_user(&self, username: &str) -> Result<Option<user::Model>> {
        Ok(user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(self.db.as_ref())
            .await?)
    }

    /// Create an account. Blank optional fields are stored as absent.
    pub async fn register_user(
        &self,
        username: &str,
        password: &str,
        display_name: Option<&str>,
        email: Option<&str>,
    ) -> Result<user::Model> {
        if self.find_user(username).await?.is_some() {
            return Err(ServerError::UserExists(username.to_string()));
        }

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64;

        let new_user = user::ActiveModel {
            username: Set(username.to_string()),
            password_hash: Set(hash_password(password)?),
            display_name: Set(non_blank(display_name)),
            email: Set(non_blank(email)),
            created_at: Set(now),
            ..Default::default()
        };

        let user = new_user.insert(self.db.as_ref()).await?;
        tracing::info!("Registered user {}", user.username);
        Ok(user)
    }

    /// Create the bootstrap account if it does not exist yet
    pub async fn ensure_admin_user(&self, username: &str, password: &str) -> Result<()> {
        if self.find_user(username).await?.is_none() {
            self.register_user(username, password, None, None).await?;
        }
        Ok(())
    }

    /// Check credentials and open a session
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Session> {
        let user = self
            .find_user(username)
            .await?
            .ok_or(ServerError::AuthFailed)?;

        if !verify_password(password, &user.password_hash) {
            return Err(ServerError::AuthFailed);
        }

        let session = Session::new(user.id, self.session_duration);
        self.sessions
            .write()
            .insert(session.token.clone(), session.clone());

        tracing::debug!("Opened session for {}", user.username);
        Ok(session)
    }

    /// Resolve a session token to the user it belongs to
    pub async fn user_for_token(&self, token: &str) -> Option<user::Model> {
        let session = self.sessions.read().get(token).cloned()?;
        if session.is_expired() {
            self.revoke_token(token);
            return None;
        }

        let user_id = session.user_id;
        match user::Entity::find_by_id(user_id).one(self.db.as_ref()).await {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!("Failed to load session user {}: {}", user_id, e);
                None
            }
        }
    }

    /// Revoke a token
    pub fn revoke_token(&self, token: &str) {
        self.sessions.write().remove(token);
    }
}
