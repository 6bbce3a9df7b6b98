//! Server configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.
//!
//! | Variable                      | Default        |
//! |-------------------------------|----------------|
//! | `TAPROOM_BIND_ADDR`           | `0.0.0.0`      |
//! | `TAPROOM_PORT`                | `8080`         |
//! | `TAPROOM_DATABASE_PATH`       | `taproom.db`   |
//! | `TAPROOM_SESSION_SECRET`      | (random)       |
//! | `TAPROOM_SESSION_TTL_SECS`    | `604800`       |
//! | `TAPROOM_FLASH_TTL_SECS`      | `300`          |
//! | `TAPROOM_SUBSCRIBER_CAPACITY` | `32`           |
//! | `TAPROOM_KEEPALIVE_SECS`      | `25`           |
//! | `TAPROOM_COOKIE_SECURE`       | `false`        |

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::codec::MIN_KEY_LEN;
use crate::session::MAX_TTL_SECS;

/// Upper bound for a subscriber queue.
pub const MAX_SUBSCRIBER_CAPACITY: usize = 1024;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind
    pub bind_addr: String,

    /// HTTP port
    pub port: u16,

    /// SQLite database file
    pub database_path: PathBuf,

    /// Signing secret for session and flash cookies.
    ///
    /// When absent a random per-process key is used and every cookie
    /// becomes invalid on restart.
    pub session_secret: Option<String>,

    /// Session lifetime in seconds
    pub session_ttl_secs: i64,

    /// Flash message lifetime in seconds
    pub flash_ttl_secs: i64,

    /// Queue capacity of each live event stream
    pub subscriber_capacity: usize,

    /// Keep-alive period of event streams, in seconds
    pub keepalive_secs: u64,

    /// Mark cookies `Secure`
    pub cookie_secure: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_addr: "0.0.0.0".to_string(),
            port: 8080,
            database_path: PathBuf::from("taproom.db"),
            session_secret: None,
            session_ttl_secs: 7 * 24 * 60 * 60,
            flash_ttl_secs: 300,
            subscriber_capacity: taproom_hub::DEFAULT_CAPACITY,
            keepalive_secs: taproom_hub::DEFAULT_KEEPALIVE.as_secs(),
            cookie_secure: false,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from any key lookup, then validates it.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ServerConfig::default();

        let config = ServerConfig {
            bind_addr: lookup("TAPROOM_BIND_ADDR").unwrap_or(defaults.bind_addr),
            port: parse_or(&lookup, "TAPROOM_PORT", defaults.port)?,
            database_path: lookup("TAPROOM_DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            session_secret: lookup("TAPROOM_SESSION_SECRET").filter(|s| !s.is_empty()),
            session_ttl_secs: parse_or(&lookup, "TAPROOM_SESSION_TTL_SECS", defaults.session_ttl_secs)?,
            flash_ttl_secs: parse_or(&lookup, "TAPROOM_FLASH_TTL_SECS", defaults.flash_ttl_secs)?,
            subscriber_capacity: parse_or(
                &lookup,
                "TAPROOM_SUBSCRIBER_CAPACITY",
                defaults.subscriber_capacity,
            )?,
            keepalive_secs: parse_or(&lookup, "TAPROOM_KEEPALIVE_SECS", defaults.keepalive_secs)?,
            cookie_secure: parse_or(&lookup, "TAPROOM_COOKIE_SECURE", defaults.cookie_secure)?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(secret) = &self.session_secret {
            if secret.len() < MIN_KEY_LEN {
                return Err(ConfigError::SecretTooShort { min: MIN_KEY_LEN });
            }
        }

        if !(1..=MAX_SUBSCRIBER_CAPACITY).contains(&self.subscriber_capacity) {
            return Err(ConfigError::InvalidValue("TAPROOM_SUBSCRIBER_CAPACITY".to_string()));
        }

        if self.keepalive_secs == 0 {
            return Err(ConfigError::InvalidValue("TAPROOM_KEEPALIVE_SECS".to_string()));
        }

        if !(1..=MAX_TTL_SECS).contains(&self.session_ttl_secs) {
            return Err(ConfigError::InvalidValue("TAPROOM_SESSION_TTL_SECS".to_string()));
        }

        if !(1..=MAX_TTL_SECS).contains(&self.flash_ttl_secs) {
            return Err(ConfigError::InvalidValue("TAPROOM_FLASH_TTL_SECS".to_string()));
        }

        Ok(())
    }

    /// Address to listen on.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.bind_addr, self.port)
            .parse()
            .map_err(|_| ConfigError::InvalidValue("TAPROOM_BIND_ADDR".to_string()))
    }

    pub fn keepalive(&self) -> Duration {
        Duration::from_secs(self.keepalive_secs)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("TAPROOM_SESSION_SECRET must be at least {min} bytes")]
    SecretTooShort { min: usize },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.subscriber_capacity, 32);
        assert_eq!(config.keepalive(), Duration::from_secs(25));
        assert!(config.session_secret.is_none());
        assert_eq!(config.socket_addr().unwrap().port(), 8080);
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("TAPROOM_PORT", "9000"),
            ("TAPROOM_SESSION_SECRET", "0123456789abcdef0123456789abcdef"),
            ("TAPROOM_COOKIE_SECURE", "true"),
            ("TAPROOM_SUBSCRIBER_CAPACITY", "16"),
        ]))
        .unwrap();
        assert_eq!(config.port, 9000);
        assert!(config.cookie_secure);
        assert_eq!(config.subscriber_capacity, 16);
        assert!(config.session_secret.is_some());
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            ServerConfig::from_lookup(lookup(&[("TAPROOM_PORT", "eighty")])),
            Err(ConfigError::InvalidValue(_))
        ));
        assert!(matches!(
            ServerConfig::from_lookup(lookup(&[("TAPROOM_SESSION_SECRET", "short")])),
            Err(ConfigError::SecretTooShort { .. })
        ));
        assert!(ServerConfig::from_lookup(lookup(&[("TAPROOM_SUBSCRIBER_CAPACITY", "0")])).is_err());
        assert!(ServerConfig::from_lookup(lookup(&[("TAPROOM_KEEPALIVE_SECS", "0")])).is_err());
    }

    #[test]
    fn test_ttl_bounds() {
        for key in ["TAPROOM_SESSION_TTL_SECS", "TAPROOM_FLASH_TTL_SECS"] {
            for raw in ["0", "-1", "10000000000000"] {
                match ServerConfig::from_lookup(lookup(&[(key, raw)])) {
                    Err(ConfigError::InvalidValue(k)) => assert_eq!(k, key),
                    other => panic!("{key}={raw} accepted: {other:?}"),
                }
            }
        }

        let ten_years = MAX_TTL_SECS.to_string();
        let config =
            ServerConfig::from_lookup(lookup(&[("TAPROOM_SESSION_TTL_SECS", &ten_years)])).unwrap();
        assert_eq!(config.session_ttl_secs, MAX_TTL_SECS);
    }

    #[test]
    fn test_empty_secret_means_absent() {
        let config =
            ServerConfig::from_lookup(lookup(&[("TAPROOM_SESSION_SECRET", "")])).unwrap();
        assert!(config.session_secret.is_none());
    }
}
