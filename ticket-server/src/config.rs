//! Server configuration.
//!
//! Everything is read from environment variables, falling back to defaults
//! suitable for running against a local backend.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::catalog::CatalogConfig;
use crate::ticker::DEFAULT_TICK;

/// Error returned when an environment variable holds an unusable value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {var}={value:?}: {reason}")]
pub struct ConfigError {
    var: &'static str,
    value: String,
    reason: &'static str,
}

/// Runtime configuration for the ticket server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (`TICKET_SERVER_ADDR`).
    pub bind_addr: SocketAddr,

    /// Marketplace API base URL (`TICKET_API_URL`).
    pub api_url: String,

    /// Service ID token for public ticket reads (`TICKET_API_TOKEN`).
    pub api_token: Option<String>,

    /// Maximum concurrent API requests (`TICKET_API_MAX_CONCURRENT`).
    pub api_max_concurrent: usize,

    /// Serve fixtures from this directory instead of calling the API
    /// (`TICKET_MOCK_DIR`).
    pub mock_dir: Option<PathBuf>,

    /// Live countdown tick period (`TICKET_TICK_MILLIS`).
    pub tick: Duration,

    /// Static assets directory (`TICKET_STATIC_DIR`).
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            api_url: "http://localhost:5000".to_string(),
            api_token: None,
            api_max_concurrent: 8,
            mock_dir: None,
            tick: DEFAULT_TICK,
            static_dir: PathBuf::from("static"),
        }
    }
}

impl ServerConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through an arbitrary lookup function.
    ///
    /// Unset and empty variables keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(value) = get("TICKET_SERVER_ADDR") {
            config.bind_addr = value.trim().parse().map_err(|_| ConfigError {
                var: "TICKET_SERVER_ADDR",
                value: value.clone(),
                reason: "expected host:port",
            })?;
        }

        if let Some(value) = get("TICKET_API_URL") {
            if !(value.starts_with("http://") || value.starts_with("https://")) {
                return Err(ConfigError {
                    var: "TICKET_API_URL",
                    value,
                    reason: "expected an http(s) URL",
                });
            }
            config.api_url = value;
        }

        config.api_token = get("TICKET_API_TOKEN");

        if let Some(value) = get("TICKET_API_MAX_CONCURRENT") {
            config.api_max_concurrent = parse_positive(&value).ok_or(ConfigError {
                var: "TICKET_API_MAX_CONCURRENT",
                value: value.clone(),
                reason: "expected a positive integer",
            })? as usize;
        }

        config.mock_dir = get("TICKET_MOCK_DIR").map(PathBuf::from);

        if let Some(value) = get("TICKET_TICK_MILLIS") {
            let millis = parse_positive(&value).ok_or(ConfigError {
                var: "TICKET_TICK_MILLIS",
                value: value.clone(),
                reason: "expected a positive number of milliseconds",
            })?;
            config.tick = Duration::from_millis(millis);
        }

        if let Some(value) = get("TICKET_STATIC_DIR") {
            config.static_dir = PathBuf::from(value);
        }

        Ok(config)
    }

    /// Catalog client configuration derived from this config.
    pub fn catalog_config(&self) -> CatalogConfig {
        let config = CatalogConfig::new(&self.api_url).with_max_concurrent(self.api_max_concurrent);
        match &self.api_token {
            Some(token) => config.with_id_token(token),
            None => config,
        }
    }
}

fn parse_positive(s: &str) -> Option<u64> {
    s.trim().parse().ok().filter(|n| *n > 0)
}
