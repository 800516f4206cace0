//! # Proxy Trait
//!
//! The capability interface call sites depend on. Only the construction
//! site names a concrete backend ([`RedisProxy`](crate::RedisProxy),
//! [`MemoryProxy`](crate::MemoryProxy)); everything else takes a
//! `&dyn CacheProxy` or a [`SharedProxy`].

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::context::Context;
use crate::error::Result;

/// Key-value cache operations
#[async_trait]
pub trait CacheProxy: Send + Sync {
    /// Fetch the value stored under `key`.
    ///
    /// # Errors
    ///
    /// [`ProxyError::NotFound`](crate::ProxyError::NotFound) when the key is
    /// absent; any backend failure is returned unchanged.
    async fn get(&self, ctx: &Context, key: &str) -> Result<String>;

    /// Store `value` under `key`.
    ///
    /// `ttl` of zero stores without expiration (clearing any earlier one).
    /// A positive `ttl` lets the backend drop the entry once it elapses.
    async fn set(&self, ctx: &Context, key: &str, value: &str, ttl: Duration) -> Result<()>;

    /// Delete `keys` in one request and return how many were removed.
    ///
    /// Absent keys contribute 0. An empty `keys` slice is a no-op.
    async fn del(&self, ctx: &Context, keys: &[&str]) -> Result<u64>;
}

/// Shared proxy handle for explicit dependency passing
pub type SharedProxy = Arc<dyn CacheProxy>;

/// Wrap a proxy for sharing across tasks
pub fn shared_proxy<P: CacheProxy + 'static>(proxy: P) -> SharedProxy {
    Arc::new(proxy)
}
