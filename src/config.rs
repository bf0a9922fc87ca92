// src/config.rs

use std::{env, fmt, net::SocketAddr};

use dotenvy::dotenv;
use url::Url;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub rust_log: String,
    pub bind_addr: SocketAddr,
    /// Public address of the site; also the allowed CORS origin.
    pub base_url: Url,
    /// Insert the demo profiles and posts into an empty database on startup.
    pub seed_data: bool,
    pub log_dir: String,
}

#[derive(Debug)]
pub enum ConfigError {
    Invalid { key: &'static str, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Invalid { key, reason } => write!(f, "invalid {}: {}", key, reason),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://sns.db?mode=rwc".to_string());

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                key: "BIND_ADDR",
                reason: e.to_string(),
            })?;

        let base_url = env::var("BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .parse::<Url>()
            .map_err(|e| ConfigError::Invalid {
                key: "BASE_URL",
                reason: e.to_string(),
            })?;

        let seed_data = match env::var("SEED_DATA") {
            Ok(value) => parse_flag(&value).ok_or(ConfigError::Invalid {
                key: "SEED_DATA",
                reason: format!("expected a boolean, got {:?}", value),
            })?,
            Err(_) => true,
        };

        let log_dir = env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string());

        Ok(Self {
            database_url,
            rust_log,
            bind_addr,
            base_url,
            seed_data,
            log_dir,
        })
    }

    /// Origin form of `base_url` (no trailing slash), as browsers send it.
    pub fn allowed_origin(&self) -> String {
        self.base_url.origin().ascii_serialization()
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
