//! # Process-wide Proxy
//!
//! One Redis-backed proxy per process for code that cannot receive the proxy
//! by argument. Prefer passing a [`SharedProxy`](crate::SharedProxy) where
//! the call graph allows it.
//!
//! Callers only ever see `&dyn CacheProxy`; this module is the construction
//! site for the concrete backend.
//!
//! ```rust,ignore
//! use cache_proxy::{global, CacheProxy, Context, ProxyConfig};
//!
//! global::initialize(ProxyConfig::from_env());
//!
//! let proxy = global::acquire().expect("initialized at startup");
//! proxy.set(&Context::background(), "foo", "bar", Duration::from_secs(10)).await?;
//! ```

use once_cell::sync::OnceCell;

use crate::cache::RedisProxy;
use crate::config::ProxyConfig;
use crate::proxy::CacheProxy;

static PROXY: OnceCell<RedisProxy> = OnceCell::new();

/// Build the process-wide proxy from `config`.
///
/// The first call wins. Concurrent callers block until it has finished and
/// then receive the same instance; their own `config` is dropped. Later
/// calls are no-ops returning the existing instance.
///
/// Nothing is validated or dialed here: a bad address is reported by the
/// first operation on the returned proxy.
pub fn initialize(config: ProxyConfig) -> &'static dyn CacheProxy {
    let mut built = false;

    let proxy = PROXY.get_or_init(|| {
        built = true;
        RedisProxy::new(config)
    });

    if built {
        tracing::info!(
            address = %proxy.config().address,
            database = proxy.config().database,
            "Cache proxy initialized"
        );
    } else {
        tracing::debug!(
            address = %proxy.config().address,
            "Cache proxy already initialized, configuration ignored"
        );
    }

    proxy
}

/// The process-wide proxy, or `None` before [`initialize`] runs.
pub fn acquire() -> Option<&'static dyn CacheProxy> {
    PROXY.get().map(|proxy| proxy as &dyn CacheProxy)
}

/// Configuration the process-wide proxy was built with.
pub fn config() -> Option<&'static ProxyConfig> {
    PROXY.get().map(RedisProxy::config)
}

/// True once [`initialize`] has run.
pub fn is_initialized() -> bool {
    PROXY.get().is_some()
}
