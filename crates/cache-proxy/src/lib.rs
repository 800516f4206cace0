//! # Cache Proxy Library
//!
//! Key-value cache facade that keeps the Redis client out of application code.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Application Layer                        │
//! │            (depends on CacheProxy / SharedProxy)             │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     CacheProxy trait                         │
//! │        get / set / del, Context first, ProxyError out        │
//! └─────────────────────────────────────────────────────────────┘
//!                    │                   │
//!                    ▼                   ▼
//! ┌─────────────────────────┐   ┌──────────────────────────────┐
//! │       RedisProxy        │   │         MemoryProxy          │
//! │ (global singleton or DI)│   │   (moka, tests / local dev)  │
//! └─────────────────────────┘   └──────────────────────────────┘
//! ```
//!
//! A cache miss is always [`ProxyError::NotFound`]. Every other failure is
//! the backend's own error, passed through untouched.
//!
//! ## Features
//!
//! - `redis`: Redis-backed proxy and the process-wide singleton (default)
//! - `memory`: in-process proxy backed by moka (default)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cache_proxy::{CacheProxy, Context, ProxyConfig, RedisProxy, shared_proxy};
//!
//! let proxy = shared_proxy(RedisProxy::new(ProxyConfig::from_env()));
//! let ctx = Context::with_timeout(Duration::from_secs(1));
//!
//! proxy.set(&ctx, "foo", "bar", Duration::from_secs(10)).await?;
//! match proxy.get(&ctx, "foo").await {
//!     Ok(value) => println!("{value}"),
//!     Err(e) if e.is_not_found() => println!("miss"),
//!     Err(e) => return Err(e.into()),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod config;
pub mod context;
pub mod error;
#[cfg(feature = "redis")]
pub mod global;
pub mod proxy;

// Re-export commonly used types
#[cfg(feature = "memory")]
pub use cache::MemoryProxy;
#[cfg(feature = "redis")]
pub use cache::RedisProxy;
pub use config::ProxyConfig;
pub use context::Context;
pub use error::{ProxyError, Result};
pub use proxy::{CacheProxy, SharedProxy, shared_proxy};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
