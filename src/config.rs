//! Server configuration from environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const ENV_DB_PATH: &str = "DISCUSSION_BOARD_DB_PATH";
pub const ENV_ADDR: &str = "DISCUSSION_BOARD_ADDR";
pub const ENV_ADMIN_PASSWORD: &str = "DISCUSSION_BOARD_ADMIN_PASSWORD";
pub const ENV_SESSION_HOURS: &str = "DISCUSSION_BOARD_SESSION_HOURS";

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// SQLite database file
    pub db_path: PathBuf,
    /// Address the HTTP server binds to
    pub bind_addr: SocketAddr,
    /// Password for the bootstrap `admin` account
    pub admin_password: String,
    /// How long a login stays valid
    pub session_duration: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir()
                .join("discussion-board")
                .join("discussions.db"),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            admin_password: "admin".to_string(),
            session_duration: Duration::from_secs(24 * 60 * 60),
        }
    }
}

impl ServerConfig {
    /// Build config from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from any key lookup. Unset keys keep their defaults;
    /// malformed ones are logged and ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = lookup(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(addr) = parse_var(&lookup, ENV_ADDR) {
            config.bind_addr = addr;
        }
        if let Some(password) = lookup(ENV_ADMIN_PASSWORD) {
            config.admin_password = password;
        }
        if let Some(hours) = parse_var::<u64>(&lookup, ENV_SESSION_HOURS) {
            config.session_duration = Duration::from_secs(hours * 60 * 60);
        }

        config
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring invalid {}={:?}", key, raw);
            None
        }
    }
}
