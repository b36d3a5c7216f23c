//! Configuration management for the Phonebook MCP Server.
//!
//! This module handles loading and validating configuration from environment variables.
//! A `.env` file is honoured if present; it is parsed without printing to stdout,
//! which MCP uses for communication.

use crate::error::{ConfigError, ConfigResult};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Database path that selects a non-durable in-memory store.
pub const IN_MEMORY_DB: &str = ":memory:";

/// Configuration for the Phonebook MCP Server.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite database file (default: "phonebook.db")
    pub db_path: PathBuf,

    /// How long a storage call waits on a locked database, in milliseconds (default: 5000)
    pub busy_timeout_ms: u64,

    /// Log level (default: "error")
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Optional environment variables:
    /// - `PHONEBOOK_DB_PATH`: SQLite database file, or `:memory:` (default: "phonebook.db")
    /// - `STORAGE_BUSY_TIMEOUT_MS`: Lock wait for storage calls (default: 5000)
    /// - `LOG_LEVEL`: Logging level (default: "error")
    pub fn from_env() -> ConfigResult<Self> {
        // Try to load .env file if it exists (but don't fail if it doesn't)
        let _ = dotenvy::dotenv();

        let db_path = match env::var("PHONEBOOK_DB_PATH") {
            Ok(val) if val.trim().is_empty() => {
                return Err(ConfigError::InvalidValue {
                    var: "PHONEBOOK_DB_PATH".to_string(),
                    reason: "Cannot be empty".to_string(),
                });
            }
            Ok(val) => PathBuf::from(val),
            Err(_) => PathBuf::from("phonebook.db"),
        };

        let busy_timeout_ms = Self::parse_env_u64("STORAGE_BUSY_TIMEOUT_MS", 5000)?;
        if busy_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                var: "STORAGE_BUSY_TIMEOUT_MS".to_string(),
                reason: "Must be greater than zero".to_string(),
            });
        }

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "error".to_string());

        Ok(Config {
            db_path,
            busy_timeout_ms,
            log_level,
        })
    }

    /// Whether the configured store lives only in memory.
    pub fn is_in_memory(&self) -> bool {
        self.db_path.as_os_str() == IN_MEMORY_DB
    }

    /// The storage lock wait as a Duration.
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    /// Parse an environment variable as u64 with a default value.
    fn parse_env_u64(var_name: &str, default: u64) -> ConfigResult<u64> {
        match env::var(var_name) {
            Ok(val) => val.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                var: var_name.to_string(),
                reason: format!("Must be a positive number, got: {}", val),
            }),
            Err(_) => Ok(default),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            db_path: PathBuf::from("phonebook.db"),
            busy_timeout_ms: 5000,
            log_level: "error".to_string(),
        }
    }
}
