//! Client configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

/// Default rest between sets when an exercise has none configured.
pub const DEFAULT_REST_SECS: u32 = 60;

/// Client configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend base URL (no trailing slash)
    pub api_url: String,
    /// Directory holding persisted client state (token, user, live session)
    pub state_dir: PathBuf,
    /// Rest duration used when an exercise has no `rest_seconds`
    pub default_rest_secs: u32,
    /// Per-request HTTP timeout
    pub http_timeout_secs: u64,
}

impl Config {
    /// Config for tests only.
    pub fn test_default() -> Self {
        Self {
            api_url: "http://127.0.0.1:8000".to_string(),
            state_dir: env::temp_dir().join("gym-session-test"),
            default_rest_secs: DEFAULT_REST_SECS,
            http_timeout_secs: 5,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is read first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let api_url = env::var("GYM_API_URL").map_err(|_| ConfigError::Missing("GYM_API_URL"))?;

        Ok(Self {
            api_url: api_url.trim().trim_end_matches('/').to_string(),
            state_dir: env::var("GYM_STATE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".gym-session")),
            default_rest_secs: parse_var("GYM_DEFAULT_REST_SECS", DEFAULT_REST_SECS)?,
            http_timeout_secs: parse_var("GYM_HTTP_TIMEOUT_SECS", 10)?,
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(name, raw)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
