//! # Cache Module
//!
//! Concrete [`CacheProxy`](crate::CacheProxy) backends.

#[cfg(feature = "memory")]
pub mod memory_proxy;
#[cfg(feature = "redis")]
pub mod redis_proxy;

#[cfg(feature = "memory")]
pub use memory_proxy::MemoryProxy;
#[cfg(feature = "redis")]
pub use redis_proxy::RedisProxy;
