//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::Level;

/// Shortest accepted `SECRET_KEY`, in bytes.
pub const MIN_SECRET_KEY_LEN: usize = 32;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub log_level: Level,
    pub model_path: PathBuf,
    /// Session signing secret. `None` means an ephemeral key is generated at startup.
    pub secret_key: Option<String>,
    pub secure_cookies: bool,
    pub session_idle_minutes: i64,
}

// Hand-written so the secret never ends up in logs.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("bind_address", &self.bind_address)
            .field("database_url", &self.database_url)
            .field("log_level", &self.log_level)
            .field("model_path", &self.model_path)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .field("secure_cookies", &self.secure_cookies)
            .field("session_idle_minutes", &self.session_idle_minutes)
            .finish()
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Server and Database Settings ---
        let bind_address_str = lookup("BIND_ADDRESS").unwrap_or_else(|| "127.0.0.1:5001".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| "sqlite://users.db".to_string());

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Model ---
        let model_path = lookup("MODEL_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("diabetes_model.json"));

        // --- Sessions ---
        let secret_key = lookup("SECRET_KEY").filter(|k| !k.is_empty());
        if let Some(key) = &secret_key {
            if key.len() < MIN_SECRET_KEY_LEN {
                return Err(ConfigError::InvalidValue(
                    "SECRET_KEY".to_string(),
                    format!("must be at least {MIN_SECRET_KEY_LEN} bytes long"),
                ));
            }
        }

        let secure_cookies = match lookup("SECURE_COOKIES").as_deref() {
            None => false,
            Some(v) => parse_bool(v).ok_or_else(|| {
                ConfigError::InvalidValue("SECURE_COOKIES".to_string(), format!("'{v}' is not a boolean"))
            })?,
        };

        let session_idle_minutes = match lookup("SESSION_IDLE_MINUTES") {
            None => 60,
            Some(v) => v
                .parse::<i64>()
                .ok()
                .filter(|m| *m > 0)
                .ok_or_else(|| {
                    ConfigError::InvalidValue(
                        "SESSION_IDLE_MINUTES".to_string(),
                        format!("'{v}' is not a positive number of minutes"),
                    )
                })?,
        };

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            model_path,
            secret_key,
            secure_cookies,
            session_idle_minutes,
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
