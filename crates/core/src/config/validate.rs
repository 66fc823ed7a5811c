use super::{types::Config, ConfigError};

const MAX_SEARCH_DEBOUNCE_MS: u64 = 10_000;
const MAX_CLOSE_DELAY_MS: u64 = 60_000;

/// Validate configuration
/// Currently validates:
/// - Database path is not empty
/// - Search debounce is at most 10 seconds
/// - Load-error close delay is at most 60 seconds
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.database.path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "database.path cannot be empty".to_string(),
        ));
    }

    if config.list.search_debounce_ms > MAX_SEARCH_DEBOUNCE_MS {
        return Err(ConfigError::ValidationError(format!(
            "list.search_debounce_ms cannot exceed {}",
            MAX_SEARCH_DEBOUNCE_MS
        )));
    }

    if config.edit.load_error_close_delay_ms > MAX_CLOSE_DELAY_MS {
        return Err(ConfigError::ValidationError(format!(
            "edit.load_error_close_delay_ms cannot exceed {}",
            MAX_CLOSE_DELAY_MS
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DatabaseConfig, EditConfig, ListConfig};
    use std::path::PathBuf;

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_empty_path_fails() {
        let config = Config {
            database: DatabaseConfig {
                path: PathBuf::new(),
            },
            ..Default::default()
        };
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_long_debounce_fails() {
        let config = Config {
            list: ListConfig {
                search_debounce_ms: 30_000,
            },
            ..Default::default()
        };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_delays_allowed() {
        let config = Config {
            list: ListConfig {
                search_debounce_ms: 0,
            },
            edit: EditConfig {
                load_error_close_delay_ms: 0,
            },
            ..Default::default()
        };
        assert!(validate_config(&config).is_ok());
    }
}
