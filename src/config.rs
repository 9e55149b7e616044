//! Runtime configuration from `RISKSCREEN_*` environment variables.

use std::path::PathBuf;

use reqwest::Url;

const ENV_API_BASE_URL: &str = "RISKSCREEN_API_BASE_URL";
const ENV_MOCK_API: &str = "RISKSCREEN_MOCK_API";
const ENV_REQUEST_TIMEOUT_SECS: &str = "RISKSCREEN_REQUEST_TIMEOUT_SECS";
const ENV_DB_PATH: &str = "RISKSCREEN_DB_PATH";
const ENV_LOG_MODE: &str = "RISKSCREEN_LOG_MODE";
const ENV_LOG_FILE: &str = "RISKSCREEN_LOG_FILE";

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8001";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_DB_PATH: &str = "riskscreen.db";
pub const DEFAULT_LOG_FILE: &str = "riskscreen.log";

/// Error type for configuration loading.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} is not a valid http(s) URL: {value}")]
    InvalidUrl { var: &'static str, value: String },

    #[error("{var} must be a positive number of seconds, got {value:?}")]
    InvalidTimeout { var: &'static str, value: String },

    #[error("{var} must be one of auto, file, stdout; got {value:?}")]
    InvalidLogMode { var: &'static str, value: String },
}

/// Where log output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
    /// File when stdout is a terminal (the TUI owns it), stdout otherwise.
    Auto,
    File,
    Stdout,
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Validated base URL, no trailing slash.
    pub api_base_url: String,
    pub mock_api: bool,
    pub request_timeout_secs: u64,
    pub db_path: PathBuf,
    pub log_mode: LogMode,
    pub log_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            mock_api: false,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            log_mode: LogMode::Auto,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    /// Returns error if a variable is set to an unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Unset and blank variables take their defaults.
    ///
    /// # Errors
    /// Returns error if a variable is set to an unusable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let mut config = Self::default();

        if let Some(raw) = get(ENV_API_BASE_URL) {
            let valid = Url::parse(&raw)
                .map(|url| matches!(url.scheme(), "http" | "https"))
                .unwrap_or(false);
            if !valid {
                return Err(ConfigError::InvalidUrl {
                    var: ENV_API_BASE_URL,
                    value: raw,
                });
            }
            config.api_base_url = raw.trim_end_matches('/').to_string();
        }

        if let Some(raw) = get(ENV_MOCK_API) {
            config.mock_api = parse_flag(&raw);
        }

        if let Some(raw) = get(ENV_REQUEST_TIMEOUT_SECS) {
            config.request_timeout_secs = raw
                .parse::<u64>()
                .ok()
                .filter(|&secs| secs > 0)
                .ok_or(ConfigError::InvalidTimeout {
                    var: ENV_REQUEST_TIMEOUT_SECS,
                    value: raw,
                })?;
        }

        if let Some(raw) = get(ENV_DB_PATH) {
            config.db_path = PathBuf::from(raw);
        }

        if let Some(raw) = get(ENV_LOG_MODE) {
            config.log_mode = match raw.to_ascii_lowercase().as_str() {
                "auto" => LogMode::Auto,
                "file" => LogMode::File,
                "stdout" => LogMode::Stdout,
                _ => {
                    return Err(ConfigError::InvalidLogMode {
                        var: ENV_LOG_MODE,
                        value: raw,
                    })
                }
            };
        }

        if let Some(raw) = get(ENV_LOG_FILE) {
            config.log_file = PathBuf::from(raw);
        }

        Ok(config)
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).expect("Defaults are valid");
        assert_eq!(config, Config::default());
        assert_eq!(config.api_base_url, "http://localhost:8001");
        assert_eq!(config.request_timeout_secs, 10);
        assert!(!config.mock_api);
        assert_eq!(config.log_mode, LogMode::Auto);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("RISKSCREEN_API_BASE_URL", "https://risk.example.org/api/"),
            ("RISKSCREEN_MOCK_API", "YES"),
            ("RISKSCREEN_REQUEST_TIMEOUT_SECS", "30"),
            ("RISKSCREEN_DB_PATH", "/tmp/rs.db"),
            ("RISKSCREEN_LOG_MODE", "stdout"),
        ])
        .expect("Should load");

        assert_eq!(config.api_base_url, "https://risk.example.org/api");
        assert!(config.mock_api);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.db_path, PathBuf::from("/tmp/rs.db"));
        assert_eq!(config.log_mode, LogMode::Stdout);
    }

    #[test]
    fn test_flag_parsing() {
        for (raw, expected) in [("1", true), ("true", true), ("no", false), ("0", false)] {
            let config = load(&[("RISKSCREEN_MOCK_API", raw)]).expect("Should load");
            assert_eq!(config.mock_api, expected, "{raw}");
        }
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let config = load(&[("RISKSCREEN_API_BASE_URL", "  ")]).expect("Should load");
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            load(&[("RISKSCREEN_API_BASE_URL", "not a url")]),
            Err(ConfigError::InvalidUrl { .. })
        ));
        assert!(matches!(
            load(&[("RISKSCREEN_API_BASE_URL", "ftp://files.example.org")]),
            Err(ConfigError::InvalidUrl { .. })
        ));
        assert!(matches!(
            load(&[("RISKSCREEN_REQUEST_TIMEOUT_SECS", "0")]),
            Err(ConfigError::InvalidTimeout { .. })
        ));
        assert!(matches!(
            load(&[("RISKSCREEN_LOG_MODE", "syslog")]),
            Err(ConfigError::InvalidLogMode { .. })
        ));
    }
}
