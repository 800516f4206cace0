//! # Redis Proxy
//!
//! The one place that names the Redis client. Everything above this module
//! sees [`CacheProxy`] and [`ProxyError`] only.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use std::fmt;
use std::time::Duration;
use tokio::sync::OnceCell;

use crate::config::ProxyConfig;
use crate::context::Context;
use crate::error::{ProxyError, Result};
use crate::proxy::CacheProxy;

/// Redis-backed cache proxy
///
/// Holds one multiplexed connection shared by every caller. Nothing is
/// parsed or dialed until the first operation, so a malformed or
/// unreachable address shows up as a [`ProxyError::Backend`] from that
/// operation.
pub struct RedisProxy {
    conn: OnceCell<ConnectionManager>,
    config: ProxyConfig,
}

impl RedisProxy {
    /// Build a proxy for `config` without connecting.
    pub fn new(config: ProxyConfig) -> Self {
        Self {
            conn: OnceCell::new(),
            config,
        }
    }

    /// Build a proxy and open its connection before returning.
    pub async fn connect(ctx: &Context, config: ProxyConfig) -> Result<Self> {
        let proxy = Self::new(config);
        ctx.run(proxy.connection()).await?;
        Ok(proxy)
    }

    pub const fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// True once the shared connection has been established.
    pub fn is_connected(&self) -> bool {
        self.conn.initialized()
    }

    /// Shared connection, opened at most once.
    ///
    /// A failed attempt leaves the cell empty so the next call retries.
    async fn connection(&self) -> Result<ConnectionManager> {
        let conn = self
            .conn
            .get_or_try_init(|| async {
                let opened = match self.config.connection_info().and_then(Client::open) {
                    Ok(client) => ConnectionManager::new(client).await,
                    Err(e) => Err(e),
                };

                match opened {
                    Ok(conn) => {
                        tracing::info!(
                            address = %self.config.address,
                            database = self.config.database,
                            "Connected to Redis"
                        );
                        Ok(conn)
                    }
                    Err(e) => {
                        tracing::warn!(
                            address = %self.config.address,
                            error = %e,
                            "Redis connection failed"
                        );
                        Err(e)
                    }
                }
            })
            .await?;

        Ok(conn.clone())
    }
}

#[async_trait]
impl CacheProxy for RedisProxy {
    async fn get(&self, ctx: &Context, key: &str) -> Result<String> {
        let value = ctx
            .run(async {
                let mut conn = self.connection().await?;
                let value: Option<String> = conn.get(key).await?;
                Ok::<_, ProxyError>(value)
            })
            .await?;

        tracing::debug!(key, hit = value.is_some(), "GET");
        into_hit(value)
    }

    async fn set(&self, ctx: &Context, key: &str, value: &str, ttl: Duration) -> Result<()> {
        ctx.run(async {
            let mut conn = self.connection().await?;
            if ttl.is_zero() {
                let _: () = conn.set(key, value).await?;
            } else {
                let _: () = conn.pset_ex(key, value, ttl_millis(ttl)).await?;
            }
            Ok::<_, ProxyError>(())
        })
        .await?;

        tracing::debug!(key, ttl_ms = ttl_millis(ttl), "SET");
        Ok(())
    }

    async fn del(&self, ctx: &Context, keys: &[&str]) -> Result<u64> {
        if keys.is_empty() {
            return Ok(0);
        }

        let removed = ctx
            .run(async {
                let mut conn = self.connection().await?;
                let removed: u64 = conn.del(keys).await?;
                Ok::<_, ProxyError>(removed)
            })
            .await?;

        tracing::debug!(keys = keys.len(), removed, "DEL");
        Ok(removed)
    }
}

impl fmt::Debug for RedisProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisProxy")
            .field("config", &self.config)
            .field("connected", &self.is_connected())
            .finish_non_exhaustive()
    }
}

/// Map the client's nil reply to [`ProxyError::NotFound`].
fn into_hit(value: Option<String>) -> Result<String> {
    value.ok_or(ProxyError::NotFound)
}

/// Longest expiry sent with `SET .. PX`. Redis rejects expiries whose
/// absolute time would overflow a signed 64-bit millisecond clock.
const MAX_TTL_MILLIS: u64 = i64::MAX.unsigned_abs() / 2;

/// Millisecond expiry for `SET .. PX`; never rounds a positive TTL to 0.
///
/// Longer TTLs are clamped to [`MAX_TTL_MILLIS`] (millions of years).
fn ttl_millis(ttl: Duration) -> u64 {
    if ttl.is_zero() {
        return 0;
    }
    u64::try_from(ttl.as_millis())
        .unwrap_or(MAX_TTL_MILLIS)
        .clamp(1, MAX_TTL_MILLIS)
}
