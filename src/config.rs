//! Process configuration from the environment (after `.env` is loaded).

use crate::error::ConfigError;
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 64 * 1024;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_LOG_FILTER: &str = "weekly_focus=info,weekly_focus_server=info,tower_http=info";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// PostgreSQL backend when set; in-memory otherwise.
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: DEFAULT_PORT,
            database_url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unset or blank keys take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();
        Ok(Self {
            host: get("HOST").unwrap_or(defaults.host),
            port: parse_or("PORT", get("PORT"), defaults.port)?,
            database_url: get("DATABASE_URL"),
            max_connections: parse_or(
                "DATABASE_MAX_CONNECTIONS",
                get("DATABASE_MAX_CONNECTIONS"),
                defaults.max_connections,
            )?,
            body_limit_bytes: parse_or(
                "BODY_LIMIT_BYTES",
                get("BODY_LIMIT_BYTES"),
                defaults.body_limit_bytes,
            )?,
        })
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigError::BindAddress(format!("{}:{}", self.host, self.port)))
    }
}

fn parse_or<T: std::str::FromStr>(
    key: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(v) => v.parse().map_err(|_| ConfigError::InvalidValue { key, value: v }),
    }
}

/// Install the global tracing subscriber, filtered by `RUST_LOG` when set.
///
/// Only the first call installs anything. Later calls, or calls after another
/// global subscriber was set (test harnesses do this), leave it in place.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
