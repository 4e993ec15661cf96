//! Credential lookup with caching and base URL resolution

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use archivum_domain::constants::SECRET_CACHE_PREFIX;
use archivum_domain::{ArchivumError, Credentials, Result};
use tracing::{debug, warn};

use crate::cache_ports::CacheStore;
use crate::secret_ports::SecretStore;

/// Secret store decorator that keeps fetched credentials in a [`CacheStore`]
/// under `secret:<name>` for the configured TTL.
///
/// Cached credentials are stored as JSON in the cache directory, so that
/// directory must not be world-readable.
pub struct CachedSecretStore {
    inner: Arc<dyn SecretStore>,
    cache: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl CachedSecretStore {
    pub fn new(inner: Arc<dyn SecretStore>, cache: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self { inner, cache, ttl }
    }

    pub fn cache_key(secret_name: &str) -> String {
        format!("{SECRET_CACHE_PREFIX}:{secret_name}")
    }
}

#[async_trait]
impl SecretStore for CachedSecretStore {
    async fn fetch_secret(&self, secret_name: &str) -> Result<Credentials> {
        let key = Self::cache_key(secret_name);

        if let Some(bytes) = self.cache.get(&key).await {
            match serde_json::from_slice::<Credentials>(&bytes) {
                Ok(credentials) => {
                    debug!(secret = %secret_name, "credentials cache hit");
                    return Ok(credentials);
                }
                Err(err) => {
                    warn!(secret = %secret_name, error = %err, "ignoring unreadable cached credentials");
                }
            }
        }

        let credentials = self.inner.fetch_secret(secret_name).await?;
        let encoded = serde_json::to_vec(&credentials)
            .map_err(|e| ArchivumError::Internal(format!("failed to encode credentials: {e}")))?;
        self.cache.put(&key, &encoded, Some(self.ttl)).await?;
        debug!(secret = %secret_name, "credentials fetched and cached");

        Ok(credentials)
    }
}

/// Decide which API base URL to talk to.
///
/// An explicitly configured URL wins; otherwise the URL stored alongside the
/// credentials is used. Trailing slashes are removed.
///
/// # Errors
/// Returns `ArchivumError::Config` when neither source provides a URL, or
/// the secret store error when the lookup fails.
pub async fn resolve_base_url(
    configured: Option<&str>,
    secrets: &dyn SecretStore,
    secret_name: &str,
) -> Result<String> {
    if let Some(url) = configured.filter(|url| !url.trim().is_empty()) {
        return Ok(url.trim().trim_end_matches('/').to_string());
    }

    let credentials = secrets.fetch_secret(secret_name).await?;
    credentials
        .api_base_url
        .filter(|url| !url.trim().is_empty())
        .map(|url| url.trim().trim_end_matches('/').to_string())
        .ok_or_else(|| {
            ArchivumError::Config(format!(
                "no base URL configured and secret '{secret_name}' does not carry one"
            ))
        })
}
