//! A malformed address still initializes the process-wide proxy; the
//! client's parse error comes back from the first operation.

#![cfg(feature = "redis")]

use std::time::Duration;

use cache_proxy::{CacheProxy, Context, ProxyConfig, global};

#[tokio::test]
async fn test_malformed_address_fails_on_first_use() {
    let proxy = global::initialize(ProxyConfig::new("redis-host:six"));

    assert!(global::is_initialized());
    assert!(global::acquire().is_some());
    assert_eq!(
        global::config().map(|c| c.address.as_str()),
        Some("redis-host:six")
    );

    let ctx = Context::with_timeout(Duration::from_secs(5));

    let err = proxy.get(&ctx, "foo").await.unwrap_err();
    assert!(err.is_backend(), "unexpected error: {err:?}");
    assert!(!err.is_not_found());

    let err = proxy
        .set(&ctx, "foo", "bar", Duration::ZERO)
        .await
        .unwrap_err();
    assert!(err.is_backend(), "unexpected error: {err:?}");
}
