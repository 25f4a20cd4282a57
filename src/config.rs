//! Client configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honored for local development.

use std::env;
use std::path::PathBuf;

/// Default backend API root (the dashboard proxies `/api` to it).
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";

/// Default location of the file-backed session store.
pub const DEFAULT_STORE_PATH: &str = ".executive-session/storage.json";

/// Client configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root URL of the backend API (no trailing slash)
    pub api_base_url: String,
    /// Path of the JSON file used as persistent key-value storage
    pub store_path: PathBuf,
    /// Whether the built-in demo accounts are accepted
    pub demo_accounts_enabled: bool,
    /// How many times an idempotent read is retried after a failure
    pub max_read_retries: u32,
    /// Base delay for exponential retry backoff, in milliseconds
    pub retry_base_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            demo_accounts_enabled: true,
            max_read_retries: 3,
            retry_base_delay_ms: 1000,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let defaults = Self::default();

        Ok(Self {
            api_base_url: env::var("API_BASE_URL")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base_url),
            store_path: env::var("SESSION_STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.store_path),
            demo_accounts_enabled: match env::var("DEMO_ACCOUNTS_ENABLED") {
                Ok(v) => parse_flag(&v),
                Err(_) => defaults.demo_accounts_enabled,
            },
            max_read_retries: parse_number("MAX_READ_RETRIES", defaults.max_read_retries)?,
            retry_base_delay_ms: parse_number("RETRY_BASE_DELAY_MS", defaults.retry_base_delay_ms)?,
        })
    }

    /// Config for tests: no retry delay, demo accounts on.
    pub fn test_default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:9/api".to_string(),
            store_path: PathBuf::from("target/test-storage.json"),
            demo_accounts_enabled: true,
            max_read_retries: 2,
            retry_base_delay_ms: 0,
        }
    }
}

fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "false" | "0" | "no" | "off"
    )
}

fn parse_number<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(v) => v.trim().parse().map_err(|_| ConfigError::Invalid(name, v)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {0}: {1:?}")]
    Invalid(&'static str, String),
}
