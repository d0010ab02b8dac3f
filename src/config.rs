// src/config.rs
use crate::forecast::ForecastSettings;
use std::env;
use std::net::SocketAddr;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: String,
    pub addr: SocketAddr,
    pub workers: usize,
    pub forecast: ForecastSettings,
    pub rust_log: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidValue(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue(msg) => write!(f, "Invalid configuration value: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl AppConfig {
    /// Reads the process environment. Call `dotenv` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset keys take their defaults.
    pub fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_path = var("PROPCAST_DB_PATH").unwrap_or_else(|| "propcast.sqlite3".to_string());

        let addr_str = var("PROPCAST_ADDR").unwrap_or_else(|| "127.0.0.1:3000".to_string());
        let addr = addr_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue(format!("PROPCAST_ADDR '{addr_str}': {e}")))?;

        let workers = match var("PROPCAST_WORKERS") {
            Some(raw) => match raw.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::InvalidValue(format!(
                        "PROPCAST_WORKERS must be a positive integer, got '{raw}'"
                    )))
                }
            },
            None => 8,
        };

        let forecast = match var("PROPCAST_INTERVAL_WIDTH") {
            Some(raw) => {
                let width = raw.parse::<f64>().map_err(|_| {
                    ConfigError::InvalidValue(format!("PROPCAST_INTERVAL_WIDTH '{raw}' is not a number"))
                })?;
                ForecastSettings::new(width).map_err(|e| ConfigError::InvalidValue(e.to_string()))?
            }
            None => ForecastSettings::default(),
        };

        let rust_log = var("RUST_LOG").unwrap_or_else(|| "info".to_string());

        Ok(Self {
            db_path,
            addr,
            workers,
            forecast,
            rust_log,
        })
    }
}
