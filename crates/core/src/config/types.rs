use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub list: ListConfig,
    #[serde(default)]
    pub edit: EditConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("weighbridge.db")
}

/// Ticket list behaviour
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ListConfig {
    /// Quiet period after the last keystroke before the search query is re-issued.
    /// Clearing the search text always re-issues immediately.
    #[serde(default = "default_search_debounce")]
    pub search_debounce_ms: u64,
}

impl ListConfig {
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            search_debounce_ms: default_search_debounce(),
        }
    }
}

fn default_search_debounce() -> u64 {
    500
}

/// Ticket edit form behaviour
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EditConfig {
    /// How long a failed load stays on screen before the form closes itself.
    #[serde(default = "default_close_delay")]
    pub load_error_close_delay_ms: u64,
}

impl EditConfig {
    pub fn load_error_close_delay(&self) -> Duration {
        Duration::from_millis(self.load_error_close_delay_ms)
    }
}

impl Default for EditConfig {
    fn default() -> Self {
        Self {
            load_error_close_delay_ms: default_close_delay(),
        }
    }
}

fn default_close_delay() -> u64 {
    1000
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
