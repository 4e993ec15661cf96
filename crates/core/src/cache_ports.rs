//! Port interfaces for the TTL cache

use std::time::Duration;

use async_trait::async_trait;
use archivum_domain::Result;

/// Key/value store with per-entry time-to-live.
///
/// Reads never fail: any fault while reading (missing file, unreadable or
/// partial metadata) is reported as a miss. Writes and removals propagate
/// their errors.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Value for `key`, or `None` when absent, expired or unreadable.
    async fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Store `value` under `key`. `None` means the entry never expires.
    async fn put(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()>;

    /// Remove one entry. Removing an absent key succeeds.
    async fn remove(&self, key: &str) -> Result<()>;

    /// Remove every entry owned by this store.
    async fn remove_all(&self) -> Result<()>;
}

/// Encode a TTL as the whole milliseconds stored alongside an entry.
///
/// `0` marks an entry that never expires, so it is reserved for `None` and
/// `Some(Duration::ZERO)`. Any other TTL rounds up to at least one
/// millisecond and saturates at `u64::MAX`.
pub fn ttl_millis(ttl: Option<Duration>) -> u64 {
    match ttl {
        None => 0,
        Some(ttl) if ttl.is_zero() => 0,
        Some(ttl) => u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1),
    }
}
