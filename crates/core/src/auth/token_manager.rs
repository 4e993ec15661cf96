//! Token manager with cache-driven refresh
//!
//! Manages the access token lifecycle:
//! - Token lookup in the shared TTL cache
//! - Login with credentials from the secret store on a miss
//! - In-process single-flight so concurrent callers share one login
//!
//! Separate processes sharing the cache directory can still both observe a
//! miss and both log in. Login is idempotent and the last write wins.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use archivum_domain::constants::{LOGIN_PATH, TOKEN_CACHE_PREFIX};
use archivum_domain::{ArchivumError, AuthToken, Result};
use serde::Deserialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use super::{AccessTokenProvider, TokenState};
use crate::cache_ports::CacheStore;
use crate::secret_ports::SecretStore;
use crate::transport_ports::{ApiRequest, HttpMethod, Transport};

/// Settings for a [`TokenManager`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenManagerConfig {
    /// Base URL of the API, without trailing slash
    pub base_url: String,
    /// Secret holding the login credentials
    pub secret_name: String,
    /// TTL applied to cached tokens
    pub cache_duration: Duration,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
}

/// Obtains and caches access tokens for one API base URL.
pub struct TokenManager {
    transport: Arc<dyn Transport>,
    cache: Arc<dyn CacheStore>,
    secrets: Arc<dyn SecretStore>,
    config: TokenManagerConfig,
    state: RwLock<TokenState>,
    refresh_lock: Mutex<()>,
}

impl TokenManager {
    /// Create a new token manager
    ///
    /// # Arguments
    /// * `config` - Base URL, secret name and token cache duration
    /// * `transport` - Used for the login call
    /// * `cache` - Shared TTL cache holding issued tokens
    /// * `secrets` - Source of login credentials
    pub fn new(
        config: TokenManagerConfig,
        transport: Arc<dyn Transport>,
        cache: Arc<dyn CacheStore>,
        secrets: Arc<dyn SecretStore>,
    ) -> Self {
        Self {
            transport,
            cache,
            secrets,
            config,
            state: RwLock::new(TokenState::NoToken),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Cache key for this client's token, scoped to the base URL and the
    /// configured cache duration.
    pub fn token_cache_key(&self) -> String {
        format!(
            "{TOKEN_CACHE_PREFIX}:{}:{}",
            self.config.base_url,
            self.config.cache_duration.as_secs()
        )
    }

    pub fn login_url(&self) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), LOGIN_PATH)
    }

    /// Current lifecycle state.
    pub async fn state(&self) -> TokenState {
        *self.state.read().await
    }

    /// Get a valid access token
    ///
    /// Returns the cached token while its TTL holds; otherwise logs in,
    /// caches the fresh token and returns it.
    ///
    /// # Errors
    /// Returns `ArchivumError::Auth` if the login call fails, the secret
    /// store error if credentials cannot be fetched, or
    /// `ArchivumError::Cache` if the fresh token cannot be written.
    pub async fn access_token(&self) -> Result<AuthToken> {
        if let Some(token) = self.cached_token().await {
            return Ok(token);
        }

        let _guard = self.refresh_lock.lock().await;

        // Another caller may have logged in while we waited for the lock.
        if let Some(token) = self.cached_token().await {
            return Ok(token);
        }

        self.set_state(TokenState::Authenticating).await;
        match self.login().await {
            Ok(token) => {
                let stored = self
                    .cache
                    .put(
                        &self.token_cache_key(),
                        token.as_str().as_bytes(),
                        Some(self.config.cache_duration),
                    )
                    .await;
                if let Err(err) = stored {
                    warn!(base_url = %self.config.base_url, error = %err, "failed to cache access token");
                    self.set_state(TokenState::NoToken).await;
                    return Err(err);
                }
                self.set_state(TokenState::Authenticated).await;
                info!(base_url = %self.config.base_url, "obtained new access token");
                Ok(token)
            }
            Err(err) => {
                self.set_state(TokenState::NoToken).await;
                Err(err)
            }
        }
    }

    /// Remove the cached token so the next request logs in again.
    ///
    /// # Errors
    /// Returns `ArchivumError::Cache` if the cache entry cannot be removed.
    pub async fn invalidate_token(&self) -> Result<()> {
        self.cache.remove(&self.token_cache_key()).await?;
        self.set_state(TokenState::NoToken).await;
        debug!(base_url = %self.config.base_url, "access token invalidated");
        Ok(())
    }

    async fn cached_token(&self) -> Option<AuthToken> {
        let cached = self.cache.get(&self.token_cache_key()).await;
        let token = cached
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .filter(|token| !token.is_empty())
            .map(AuthToken::new);

        let mut state = self.state.write().await;
        match (&token, *state) {
            (Some(_), _) => *state = TokenState::Authenticated,
            (None, TokenState::Authenticated) => {
                debug!(base_url = %self.config.base_url, "cached access token expired");
                *state = TokenState::Expired;
            }
            (None, _) => {}
        }
        token
    }

    async fn login(&self) -> Result<AuthToken> {
        let url = self.login_url();
        let credentials = self.secrets.fetch_secret(&self.config.secret_name).await?;

        debug!(url = %url, "logging in");
        let request = ApiRequest::post(&url).form_body(&[
            ("username", credentials.username.as_str()),
            ("password", credentials.password.as_str()),
        ]);

        let auth_error = |status: Option<u16>, reason: String| ArchivumError::Auth {
            method: HttpMethod::Post.to_string(),
            url: url.clone(),
            status,
            reason,
        };

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|err| auth_error(None, err.to_string()))?;

        if !response.is_success() {
            warn!(url = %url, status = response.status, "login rejected");
            let body = response.text();
            let reason = if body.is_empty() { "login rejected".to_string() } else { body };
            return Err(auth_error(Some(response.status), reason));
        }

        let parsed: LoginResponse = serde_json::from_slice(&response.body).map_err(|err| {
            auth_error(Some(response.status), format!("unreadable login response: {err}"))
        })?;

        if parsed.token.is_empty() {
            return Err(auth_error(Some(response.status), "login returned an empty token".into()));
        }

        Ok(AuthToken::new(parsed.token))
    }

    async fn set_state(&self, next: TokenState) {
        *self.state.write().await = next;
    }
}

#[async_trait]
impl AccessTokenProvider for TokenManager {
    async fn access_token(&self) -> Result<AuthToken> {
        TokenManager::access_token(self).await
    }

    async fn invalidate(&self) -> Result<()> {
        self.invalidate_token().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MapCache, ScriptedTransport, StaticSecretStore};
    use crate::time::MockClock;
    use crate::transport_ports::ApiResponse;

    const BASE: &str = "https://archive.example.com";

    struct Fixture {
        manager: Arc<TokenManager>,
        transport: Arc<ScriptedTransport>,
        secrets: Arc<StaticSecretStore>,
        clock: MockClock,
    }

    fn fixture(responder: impl Fn(&ApiRequest) -> Result<ApiResponse> + Send + Sync + 'static) -> Fixture {
        let clock = MockClock::at_millis(1_000_000);
        let transport = Arc::new(ScriptedTransport::new(responder));
        let secrets = Arc::new(StaticSecretStore::new("archivist", "s3cret", None));
        let cache = Arc::new(MapCache::with_clock(clock.clone()));
        let manager = Arc::new(TokenManager::new(
            TokenManagerConfig {
                base_url: BASE.into(),
                secret_name: "archive".into(),
                cache_duration: Duration::from_secs(900),
            },
            transport.clone(),
            cache,
            secrets.clone(),
        ));
        Fixture { manager, transport, secrets, clock }
    }

    fn token_response(_request: &ApiRequest) -> Result<ApiResponse> {
        Ok(ApiResponse::new(200, r#"{"token":"abc-123","refresh-token":"r"}"#))
    }

    #[tokio::test]
    async fn reuses_cached_token_within_ttl() {
        let f = fixture(token_response);

        let first = f.manager.access_token().await.unwrap();
        let second = f.manager.access_token().await.unwrap();

        assert_eq!(first.as_str(), "abc-123");
        assert_eq!(first, second);
        assert_eq!(f.transport.count_ending_with(LOGIN_PATH), 1);
        assert_eq!(f.manager.state().await, TokenState::Authenticated);
    }

    #[tokio::test]
    async fn logs_in_again_after_ttl_elapses() {
        let f = fixture(token_response);

        f.manager.access_token().await.unwrap();
        f.clock.advance(Duration::from_secs(901));
        f.manager.access_token().await.unwrap();

        assert_eq!(f.transport.count_ending_with(LOGIN_PATH), 2);
    }

    #[tokio::test]
    async fn login_posts_form_encoded_credentials() {
        let f = fixture(token_response);
        f.manager.access_token().await.unwrap();

        let requests = f.transport.requests();
        assert_eq!(requests.len(), 1);
        let login = &requests[0];
        assert_eq!(login.method, HttpMethod::Post);
        assert_eq!(login.url, format!("{BASE}{LOGIN_PATH}"));
        assert_eq!(login.header_value("content-type"), Some("application/x-www-form-urlencoded"));
        let body = String::from_utf8(login.body.clone().unwrap()).unwrap();
        assert_eq!(body, "username=archivist&password=s3cret");
        assert_eq!(f.secrets.calls(), 1);
    }

    #[tokio::test]
    async fn failed_login_is_reported_and_not_cached() {
        let f = fixture(|_| Ok(ApiResponse::new(401, "bad credentials")));

        let err = f.manager.access_token().await.unwrap_err();
        match err {
            ArchivumError::Auth { method, url, status, reason } => {
                assert_eq!(method, "POST");
                assert_eq!(url, format!("{BASE}{LOGIN_PATH}"));
                assert_eq!(status, Some(401));
                assert_eq!(reason, "bad credentials");
            }
            other => panic!("expected auth error, got {other:?}"),
        }
        assert_eq!(f.manager.state().await, TokenState::NoToken);

        // Nothing was cached, so the next call tries again.
        let _ = f.manager.access_token().await;
        assert_eq!(f.transport.count_ending_with(LOGIN_PATH), 2);
    }

    #[tokio::test]
    async fn transport_fault_during_login_is_an_auth_error_without_status() {
        let f = fixture(|_| Err(ArchivumError::Network("connection refused".into())));

        let err = f.manager.access_token().await.unwrap_err();
        assert!(matches!(err, ArchivumError::Auth { status: None, .. }));
    }

    #[tokio::test]
    async fn malformed_login_body_is_rejected() {
        let f = fixture(|_| Ok(ApiResponse::new(200, "<html>maintenance</html>")));
        let err = f.manager.access_token().await.unwrap_err();
        assert!(matches!(err, ArchivumError::Auth { status: Some(200), .. }));
    }

    #[tokio::test]
    async fn expired_token_moves_state_to_expired() {
        let f = fixture(token_response);

        f.manager.access_token().await.unwrap();
        f.clock.advance(Duration::from_secs(901));

        assert!(f.manager.cached_token().await.is_none());
        assert_eq!(f.manager.state().await, TokenState::Expired);
    }

    #[tokio::test]
    async fn invalidate_forces_a_new_login() {
        let f = fixture(token_response);

        f.manager.access_token().await.unwrap();
        f.manager.invalidate_token().await.unwrap();
        assert_eq!(f.manager.state().await, TokenState::NoToken);
        f.manager.access_token().await.unwrap();

        assert_eq!(f.transport.count_ending_with(LOGIN_PATH), 2);
    }

    /// Reads always miss and writes fail, like a full disk.
    struct UnwritableCache;

    #[async_trait]
    impl CacheStore for UnwritableCache {
        async fn get(&self, _key: &str) -> Option<Vec<u8>> {
            None
        }

        async fn put(&self, _key: &str, _value: &[u8], _ttl: Option<Duration>) -> Result<()> {
            Err(ArchivumError::Cache("disk full".into()))
        }

        async fn remove(&self, _key: &str) -> Result<()> {
            Ok(())
        }

        async fn remove_all(&self) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn token_cache_write_failure_resets_state() {
        let transport = Arc::new(ScriptedTransport::new(token_response));
        let manager = TokenManager::new(
            TokenManagerConfig {
                base_url: BASE.into(),
                secret_name: "archive".into(),
                cache_duration: Duration::from_secs(900),
            },
            transport.clone(),
            Arc::new(UnwritableCache),
            Arc::new(StaticSecretStore::new("archivist", "s3cret", None)),
        );

        let err = manager.access_token().await.unwrap_err();

        assert!(matches!(err, ArchivumError::Cache(ref msg) if msg == "disk full"), "got {err:?}");
        assert_eq!(manager.state().await, TokenState::NoToken);
        assert_eq!(transport.count_ending_with(LOGIN_PATH), 1);
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_login() {
        let f = fixture(token_response);

        let calls = (0..8).map(|_| {
            let manager = f.manager.clone();
            async move { manager.access_token().await }
        });
        let tokens = futures::future::join_all(calls).await;

        for token in tokens {
            assert_eq!(token.unwrap().as_str(), "abc-123");
        }
        assert_eq!(f.transport.count_ending_with(LOGIN_PATH), 1);
    }

    #[test]
    fn token_key_is_scoped_to_url_and_duration() {
        let f = fixture(token_response);
        assert_eq!(f.manager.token_cache_key(), format!("token:{BASE}:900"));
    }
}
