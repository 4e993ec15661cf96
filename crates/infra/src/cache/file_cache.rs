//! Filesystem TTL cache shared across processes
//!
//! Each key maps to one value file named by a fixed prefix plus the hex
//! SHA-256 of the key. Two sidecar files next to it hold the entry's
//! metadata as ASCII milliseconds:
//!
//! - `<file>.entry-time`: wall-clock time the entry was written
//! - `<file>.ttl`: time-to-live, `0` meaning the entry never expires
//!
//! Expiry is passive: a stale entry is reported as a miss and left on disk
//! until it is overwritten or removed. A missing or unparseable sidecar is a
//! miss, so a write interrupted half-way never blocks later writes.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use archivum_core::cache_ports::{ttl_millis, CacheStore};
use archivum_core::time::{Clock, SystemClock};
use archivum_domain::{ArchivumError, Result};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tracing::{debug, trace, warn};

use crate::errors::InfraError;

/// Prefix shared by every file this cache owns.
pub const CACHE_FILE_PREFIX: &str = "archivum-cache-";

const TTL_SUFFIX: &str = ".ttl";
const ENTRY_TIME_SUFFIX: &str = ".entry-time";

/// Directory used when none is configured.
pub fn default_cache_dir() -> PathBuf {
    std::env::temp_dir().join("archivum")
}

/// Value file name for `key`.
pub fn cache_file_name(key: &str) -> String {
    let digest = Sha256::digest(key.as_bytes());
    format!("{CACHE_FILE_PREFIX}{}", hex::encode(digest))
}

/// TTL cache storing one file per key in a shared directory.
///
/// Generic over `Clock` for deterministic expiry tests.
#[derive(Debug, Clone)]
pub struct FileCache<C: Clock = SystemClock> {
    dir: PathBuf,
    clock: C,
}

impl FileCache<SystemClock> {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_clock(dir, SystemClock)
    }
}

impl<C: Clock> FileCache<C> {
    pub fn with_clock(dir: impl Into<PathBuf>, clock: C) -> Self {
        Self { dir: dir.into(), clock }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the value file for `key`.
    pub fn value_path(&self, key: &str) -> PathBuf {
        self.dir.join(cache_file_name(key))
    }

    fn sidecar(value_path: &Path, suffix: &str) -> PathBuf {
        let mut name = value_path.as_os_str().to_os_string();
        name.push(suffix);
        PathBuf::from(name)
    }

    async fn read_millis(path: &Path) -> Option<u64> {
        let raw = tokio::fs::read_to_string(path).await.ok()?;
        raw.trim().parse().ok()
    }
}

#[async_trait]
impl<C: Clock + 'static> CacheStore for FileCache<C> {
    async fn get(&self, key: &str) -> Option<Vec<u8>> {
        let path = self.value_path(key);

        let ttl = Self::read_millis(&Self::sidecar(&path, TTL_SUFFIX)).await?;
        let created = Self::read_millis(&Self::sidecar(&path, ENTRY_TIME_SUFFIX)).await?;

        if ttl != 0 {
            let age = self.clock.millis_since_epoch().saturating_sub(created);
            if age >= ttl {
                trace!(age_ms = age, ttl_ms = ttl, "cache entry expired");
                return None;
            }
        }

        match tokio::fs::read(&path).await {
            Ok(value) => Some(value),
            Err(err) => {
                if err.kind() != ErrorKind::NotFound {
                    warn!(path = %path.display(), error = %err, "unreadable cache entry");
                }
                None
            }
        }
    }

    async fn put(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(cache_error)?;

        let path = self.value_path(key);
        let ttl_path = Self::sidecar(&path, TTL_SUFFIX);
        let time_path = Self::sidecar(&path, ENTRY_TIME_SUFFIX);

        // Old metadata must not vouch for a half-written value.
        remove_if_present(&ttl_path).await?;
        remove_if_present(&time_path).await?;

        tokio::fs::write(&path, value).await.map_err(cache_error)?;

        let now = self.clock.millis_since_epoch();
        let ttl_ms = ttl_millis(ttl);
        tokio::fs::write(&time_path, now.to_string()).await.map_err(cache_error)?;
        tokio::fs::write(&ttl_path, ttl_ms.to_string()).await.map_err(cache_error)?;

        debug!(path = %path.display(), ttl_ms, "cache entry written");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let path = self.value_path(key);
        remove_if_present(&path).await?;
        remove_if_present(&Self::sidecar(&path, TTL_SUFFIX)).await?;
        remove_if_present(&Self::sidecar(&path, ENTRY_TIME_SUFFIX)).await?;
        Ok(())
    }

    async fn remove_all(&self) -> Result<()> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(()),
            Err(err) => return Err(cache_error(err)),
        };

        let mut removed = 0usize;
        while let Some(entry) = entries.next_entry().await.map_err(cache_error)? {
            let owned = entry.file_name().to_str().is_some_and(|name| name.starts_with(CACHE_FILE_PREFIX));
            if owned {
                remove_if_present(&entry.path()).await?;
                removed += 1;
            }
        }

        debug!(dir = %self.dir.display(), removed, "cache cleared");
        Ok(())
    }
}

async fn remove_if_present(path: &Path) -> Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(cache_error(err)),
    }
}

fn cache_error(err: std::io::Error) -> ArchivumError {
    let infra: InfraError = err.into();
    infra.into()
}
