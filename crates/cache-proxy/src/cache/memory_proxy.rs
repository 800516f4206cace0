//! In-process cache proxy backed by moka.
//!
//! Same contract as the Redis proxy: a miss is [`ProxyError::NotFound`],
//! a zero TTL never expires, and `del` counts only live keys.

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use std::fmt;
use std::time::{Duration, Instant};

use crate::context::Context;
use crate::error::{ProxyError, Result};
use crate::proxy::CacheProxy;

/// TTLs past this are stored without expiry.
const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    ttl: Option<Duration>,
    expires_at: Option<Instant>,
}

impl Entry {
    fn new(value: &str, ttl: Duration) -> Self {
        let ttl = (!ttl.is_zero() && ttl <= MAX_TTL).then_some(ttl);
        Self {
            value: value.to_string(),
            ttl,
            expires_at: ttl.and_then(|t| Instant::now().checked_add(t)),
        }
    }

    fn is_live(&self) -> bool {
        self.expires_at.is_none_or(|at| Instant::now() < at)
    }
}

/// Per-entry expiry: each write replaces the previous TTL.
struct EntryExpiry;

impl Expiry<String, Entry> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &Entry,
        _created_at: Instant,
    ) -> Option<Duration> {
        entry.ttl
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        entry.ttl
    }
}

/// Moka-based cache proxy
#[derive(Clone)]
pub struct MemoryProxy {
    cache: Cache<String, Entry>,
}

impl MemoryProxy {
    /// Unbounded in-memory proxy
    pub fn new() -> Self {
        Self {
            cache: Cache::builder().expire_after(EntryExpiry).build(),
        }
    }

    /// In-memory proxy holding at most `max_entries` keys
    pub fn bounded(max_entries: u64) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(max_entries)
                .expire_after(EntryExpiry)
                .build(),
        }
    }

    /// Approximate number of stored entries.
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

impl Default for MemoryProxy {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheProxy for MemoryProxy {
    async fn get(&self, ctx: &Context, key: &str) -> Result<String> {
        let entry = ctx
            .run(async { Ok::<_, ProxyError>(self.cache.get(key).await) })
            .await?;

        match entry.filter(Entry::is_live) {
            Some(entry) => {
                tracing::debug!(key, hit = true, "GET");
                Ok(entry.value)
            }
            None => {
                tracing::debug!(key, hit = false, "GET");
                Err(ProxyError::NotFound)
            }
        }
    }

    async fn set(&self, ctx: &Context, key: &str, value: &str, ttl: Duration) -> Result<()> {
        ctx.run(async {
            self.cache
                .insert(key.to_string(), Entry::new(value, ttl))
                .await;
            Ok::<_, ProxyError>(())
        })
        .await?;

        tracing::debug!(key, ttl = ?ttl, "SET");
        Ok(())
    }

    async fn del(&self, ctx: &Context, keys: &[&str]) -> Result<u64> {
        if keys.is_empty() {
            return Ok(0);
        }

        let removed = ctx
            .run(async {
                let mut removed = 0_u64;
                for key in keys {
                    if self.cache.remove(*key).await.is_some_and(|e| e.is_live()) {
                        removed += 1;
                    }
                }
                Ok::<_, ProxyError>(removed)
            })
            .await?;

        tracing::debug!(keys = keys.len(), removed, "DEL");
        Ok(removed)
    }
}

impl fmt::Debug for MemoryProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryProxy")
            .field("entry_count", &self.cache.entry_count())
            .field("weighted_size", &self.cache.weighted_size())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::{Fake, Faker};
    use tokio::time::sleep;
    use tokio_test::assert_ok;

    fn ctx() -> Context {
        Context::background()
    }

    #[tokio::test]
    async fn test_get_unset_key_is_not_found() {
        let proxy = MemoryProxy::new();

        for _ in 0..20 {
            let key: String = Faker.fake();
            let err = proxy.get(&ctx(), &key).await.unwrap_err();
            assert!(err.is_not_found(), "key {key:?}");
        }
    }

    #[tokio::test]
    async fn test_set_without_ttl_persists() {
        let proxy = MemoryProxy::new();

        for _ in 0..20 {
            let key: String = Faker.fake();
            let value: String = Faker.fake();
            assert_ok!(proxy.set(&ctx(), &key, &value, Duration::ZERO).await);
            assert_eq!(proxy.get(&ctx(), &key).await.unwrap(), value);
        }
    }

    #[tokio::test]
    async fn test_set_with_ttl_expires() {
        let proxy = MemoryProxy::new();

        proxy
            .set(&ctx(), "session", "abc", Duration::from_millis(100))
            .await
            .unwrap();
        assert_eq!(proxy.get(&ctx(), "session").await.unwrap(), "abc");

        sleep(Duration::from_millis(250)).await;

        let err = proxy.get(&ctx(), "session").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_overwrite_without_ttl_clears_expiry() {
        let proxy = MemoryProxy::new();

        proxy
            .set(&ctx(), "k", "short", Duration::from_millis(100))
            .await
            .unwrap();
        proxy.set(&ctx(), "k", "long", Duration::ZERO).await.unwrap();

        sleep(Duration::from_millis(250)).await;

        assert_eq!(proxy.get(&ctx(), "k").await.unwrap(), "long");
    }

    #[tokio::test]
    async fn test_huge_ttl_never_expires() {
        let proxy = MemoryProxy::new();

        proxy.set(&ctx(), "k", "v", Duration::MAX).await.unwrap();
        assert_eq!(proxy.get(&ctx(), "k").await.unwrap(), "v");
        assert_eq!(Entry::new("v", Duration::MAX).ttl, None);
    }

    #[tokio::test]
    async fn test_del_counts_only_present_keys() {
        let proxy = MemoryProxy::new();

        assert_eq!(proxy.del(&ctx(), &["absent"]).await.unwrap(), 0);

        proxy.set(&ctx(), "k1", "v1", Duration::ZERO).await.unwrap();
        assert_eq!(proxy.del(&ctx(), &["k1", "k2"]).await.unwrap(), 1);
        assert!(proxy.get(&ctx(), "k1").await.unwrap_err().is_not_found());

        proxy.set(&ctx(), "k1", "v1", Duration::ZERO).await.unwrap();
        assert_eq!(proxy.del(&ctx(), &["k1"]).await.unwrap(), 1);
        assert_eq!(proxy.del(&ctx(), &["k1"]).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_del_expired_key_counts_zero() {
        let proxy = MemoryProxy::new();

        proxy
            .set(&ctx(), "k", "v", Duration::from_millis(50))
            .await
            .unwrap();
        sleep(Duration::from_millis(150)).await;

        assert_eq!(proxy.del(&ctx(), &["k"]).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_del_without_keys() {
        let proxy = MemoryProxy::new();
        assert_eq!(proxy.del(&ctx(), &[]).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_scenario_set_get_del() {
        let proxy = MemoryProxy::new();
        let ctx = ctx();

        proxy
            .set(&ctx, "foo", "bar", Duration::from_secs(10))
            .await
            .unwrap();
        assert_eq!(proxy.get(&ctx, "foo").await.unwrap(), "bar");

        assert_eq!(proxy.del(&ctx, &["foo"]).await.unwrap(), 1);
        assert!(proxy.get(&ctx, "foo").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_cancelled_context_does_not_write() {
        let proxy = MemoryProxy::new();
        let cancelled = Context::background();
        cancelled.cancel();

        let err = proxy
            .set(&cancelled, "foo", "bar", Duration::ZERO)
            .await
            .unwrap_err();
        assert!(matches!(err, ProxyError::Cancelled));

        assert!(proxy.get(&ctx(), "foo").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_bounded_proxy_serves_reads() {
        let proxy = MemoryProxy::bounded(8);

        proxy.set(&ctx(), "a", "1", Duration::ZERO).await.unwrap();
        assert_eq!(proxy.get(&ctx(), "a").await.unwrap(), "1");
    }

    #[tokio::test]
    async fn test_usable_through_trait_object() {
        let proxy: crate::SharedProxy = crate::shared_proxy(MemoryProxy::new());

        proxy.set(&ctx(), "a", "1", Duration::ZERO).await.unwrap();
        assert_eq!(proxy.get(&ctx(), "a").await.unwrap(), "1");
    }
}
