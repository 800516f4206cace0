//! # Proxy Configuration
//!
//! Connection parameters for the cache backend. Loaded from the environment
//! or deserialized from the embedding application's own config.

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;

const DEFAULT_ADDRESS: &str = "127.0.0.1:6379";

/// Backend connection configuration
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Server address as `host:port`
    pub address: String,

    /// Optional credential
    pub password: Option<String>,

    /// Database (namespace) index
    pub database: i64,
}

impl ProxyConfig {
    /// Configuration for `address` with no password and database 0.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_password(self, password: impl Into<String>) -> Self {
        Self {
            password: Some(password.into()),
            ..self
        }
    }

    #[must_use]
    pub fn with_database(self, database: i64) -> Self {
        Self { database, ..self }
    }

    /// Load configuration from environment variables
    ///
    /// - `CACHE_ADDR` (default `127.0.0.1:6379`)
    /// - `CACHE_PASSWORD` (unset or empty means no credential)
    /// - `CACHE_DB` (default `0`)
    pub fn from_env() -> Self {
        Self {
            address: env::var("CACHE_ADDR").unwrap_or_else(|_| DEFAULT_ADDRESS.to_string()),

            password: env::var("CACHE_PASSWORD").ok().filter(|p| !p.is_empty()),

            database: env::var("CACHE_DB")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
        }
    }

    /// Connection parameters understood by the Redis client.
    ///
    /// The address is parsed by the client, so a malformed one is reported
    /// as the client's own error.
    #[cfg(feature = "redis")]
    pub fn connection_info(&self) -> redis::RedisResult<redis::ConnectionInfo> {
        use redis::IntoConnectionInfo;

        let mut info =
            format!("redis://{}/{}", self.address.trim(), self.database).into_connection_info()?;
        info.redis.password.clone_from(&self.password);
        Ok(info)
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            password: None,
            database: 0,
        }
    }
}

impl fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("address", &self.address)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("database", &self.database)
            .finish()
    }
}
