mod config;
pub mod database;
mod store;

pub use config::{Config, LedgerConfig, NotificationsConfig, TimerConfig};
pub use database::Database;
pub use store::{MemoryStore, PersistentStore};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Resolves the directory holding `config.toml` and `pomoquest.db`.
///
/// `POMOQUEST_DATA_DIR` wins when set. Otherwise `~/.config/pomoquest[-dev]/`
/// based on POMOQUEST_ENV (set POMOQUEST_ENV=dev for a development copy).
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("POMOQUEST_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env =
                std::env::var("POMOQUEST_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("pomoquest-dev")
            } else {
                base_dir.join("pomoquest")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
