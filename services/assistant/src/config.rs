//! services/assistant/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use learning_assistant_core::Language;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// The learner profile sent along with every content request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LearnerProfile {
    pub grade: String,
    pub board: String,
    pub locale: String,
}

impl Default for LearnerProfile {
    fn default() -> Self {
        Self {
            grade: "Class 10".to_string(),
            board: "CBSE".to_string(),
            locale: "IN".to_string(),
        }
    }
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub api_base_url: String,
    pub data_dir: PathBuf,
    pub log_level: Level,
    pub request_timeout: Duration,
    pub default_language: Language,
    pub profile: LearnerProfile,
    /// `None` disables client-side session expiry.
    pub session_ttl: Option<chrono::Duration>,
    pub action_debounce: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3000".to_string(),
            data_dir: PathBuf::from("./data"),
            log_level: Level::INFO,
            request_timeout: Duration::from_secs(15),
            default_language: Language::English,
            profile: LearnerProfile::default(),
            session_ttl: Some(chrono::Duration::days(30)),
            action_debounce: Duration::from_millis(400),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        let defaults = Self::default();

        // --- Backend Settings ---
        let api_base_url = std::env::var("API_BASE_URL")
            .map(|url| normalize_base_url(&url))
            .unwrap_or(defaults.api_base_url);
        if !api_base_url.starts_with("http://") && !api_base_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue(
                "API_BASE_URL".to_string(),
                format!("'{}' is not an http(s) URL", api_base_url),
            ));
        }

        let request_timeout = Duration::from_secs(parse_var("REQUEST_TIMEOUT_SECS", 15u64)?);

        // --- Storage and Logging ---
        let data_dir = std::env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Learner Settings ---
        let default_language = match std::env::var("DEFAULT_LANGUAGE") {
            Ok(code) => code
                .parse::<Language>()
                .map_err(|e| ConfigError::InvalidValue("DEFAULT_LANGUAGE".to_string(), e))?,
            Err(_) => defaults.default_language,
        };

        let profile = LearnerProfile {
            grade: std::env::var("STUDENT_GRADE").unwrap_or(defaults.profile.grade),
            board: std::env::var("BOARD").unwrap_or(defaults.profile.board),
            locale: std::env::var("LOCALE").unwrap_or(defaults.profile.locale),
        };

        // --- Session and Interaction Settings ---
        let ttl_days: i64 = parse_var("SESSION_TTL_DAYS", 30)?;
        let session_ttl = (ttl_days > 0).then(|| chrono::Duration::days(ttl_days));

        let action_debounce = Duration::from_millis(parse_var("ACTION_DEBOUNCE_MS", 400u64)?);

        Ok(Self {
            api_base_url,
            data_dir,
            log_level,
            request_timeout,
            default_language,
            profile,
            session_ttl,
            action_debounce,
        })
    }
}

/// Trims whitespace and trailing slashes so paths can be appended verbatim.
pub fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}
