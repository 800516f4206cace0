//! Cache proxy error types

use thiserror::Error;

/// Errors returned by every [`CacheProxy`](crate::CacheProxy) operation.
///
/// `NotFound` is the only kind this crate synthesizes. Backend failures are
/// carried as-is so callers can still inspect the client's own error kind.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The key is absent (never set, deleted, or expired).
    #[error("key not found")]
    NotFound,

    /// Failure reported by the Redis client, unmodified.
    #[cfg(feature = "redis")]
    #[error(transparent)]
    Backend(#[from] redis::RedisError),

    /// The caller's context was cancelled before the call completed.
    #[error("operation cancelled")]
    Cancelled,

    /// The caller's context deadline passed before the call completed.
    #[error("deadline exceeded")]
    DeadlineExceeded,
}

impl ProxyError {
    /// True for a cache miss.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    /// True when the failure came from the backend client.
    #[must_use]
    pub const fn is_backend(&self) -> bool {
        #[cfg(feature = "redis")]
        {
            matches!(self, Self::Backend(_))
        }
        #[cfg(not(feature = "redis"))]
        {
            false
        }
    }
}

pub type Result<T> = std::result::Result<T, ProxyError>;
