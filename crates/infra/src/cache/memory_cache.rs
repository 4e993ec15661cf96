//! In-process TTL cache with moka
//!
//! Suited to short-lived clients that do not need tokens to survive a
//! restart. Each entry carries its own TTL through a moka `Expiry` policy.

use std::time::{Duration, Instant};

use archivum_core::cache_ports::CacheStore;
use archivum_domain::Result;
use async_trait::async_trait;
use moka::future::Cache;
use moka::Expiry;

/// Default max capacity for the memory cache (entries)
pub const DEFAULT_MEMORY_CACHE_CAPACITY: u64 = 1_000;

#[derive(Debug, Clone)]
struct CachedValue {
    bytes: Vec<u8>,
    ttl: Option<Duration>,
}

struct PerEntryTtl;

impl Expiry<String, CachedValue> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        value.ttl
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedValue,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        value.ttl
    }
}

/// Memory-backed [`CacheStore`].
#[derive(Clone)]
pub struct MemoryCache {
    inner: Cache<String, CachedValue>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MEMORY_CACHE_CAPACITY)
    }

    pub fn with_capacity(max_capacity: u64) -> Self {
        let inner = Cache::builder().max_capacity(max_capacity).expire_after(PerEntryTtl).build();
        Self { inner }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.inner.get(key).await.map(|value| value.bytes)
    }

    async fn put(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        // A zero TTL means "never expires", matching the file cache.
        let ttl = ttl.filter(|ttl| !ttl.is_zero());
        self.inner.insert(key.to_string(), CachedValue { bytes: value.to_vec(), ttl }).await;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.inner.invalidate(key).await;
        Ok(())
    }

    async fn remove_all(&self) -> Result<()> {
        self.inner.invalidate_all();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stores_and_removes_entries() {
        let cache = MemoryCache::new();

        cache.put("a", b"1", Some(Duration::from_secs(60))).await.unwrap();
        cache.put("b", b"2", None).await.unwrap();
        assert_eq!(cache.get("a").await, Some(b"1".to_vec()));

        cache.remove("a").await.unwrap();
        assert_eq!(cache.get("a").await, None);
        assert_eq!(cache.get("b").await, Some(b"2".to_vec()));

        cache.remove_all().await.unwrap();
        assert_eq!(cache.get("b").await, None);
    }

    #[tokio::test]
    async fn entries_expire_after_their_own_ttl() {
        let cache = MemoryCache::new();
        cache.put("short", b"x", Some(Duration::from_millis(50))).await.unwrap();
        cache.put("long", b"y", Some(Duration::from_secs(60))).await.unwrap();

        tokio::time::sleep(Duration::from_millis(120)).await;

        assert_eq!(cache.get("short").await, None);
        assert_eq!(cache.get("long").await, Some(b"y".to_vec()));
    }
}
