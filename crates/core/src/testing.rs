//! In-memory test doubles for the core ports
//!
//! Available to this crate's tests and, through the `test-utils` feature, to
//! downstream integration tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use archivum_domain::{ArchivumError, Credentials, Result};

use crate::cache_ports::{ttl_millis, CacheStore};
use crate::secret_ports::SecretStore;
use crate::time::{Clock, MockClock};
use crate::transport_ports::{ApiRequest, ApiResponse, Transport};

type Entry = (Vec<u8>, u64, u64);

/// `HashMap`-backed cache honoring TTLs against a [`MockClock`].
#[derive(Debug, Default, Clone)]
pub struct MapCache {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
    clock: MockClock,
}

impl MapCache {
    pub fn with_clock(clock: MockClock) -> Self {
        Self { entries: Arc::default(), clock }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CacheStore for MapCache {
    async fn get(&self, key: &str) -> Option<Vec<u8>> {
        let entries = self.entries.lock().ok()?;
        let (value, created, ttl) = entries.get(key)?;
        let now = self.clock.millis_since_epoch();
        if *ttl != 0 && now.saturating_sub(*created) >= *ttl {
            return None;
        }
        Some(value.clone())
    }

    async fn put(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        let ttl_ms = ttl_millis(ttl);
        let created = self.clock.millis_since_epoch();
        self.entries
            .lock()
            .map_err(|_| ArchivumError::Cache("map cache lock poisoned".into()))?
            .insert(key.to_string(), (value.to_vec(), created, ttl_ms));
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries
            .lock()
            .map_err(|_| ArchivumError::Cache("map cache lock poisoned".into()))?
            .remove(key);
        Ok(())
    }

    async fn remove_all(&self) -> Result<()> {
        self.entries
            .lock()
            .map_err(|_| ArchivumError::Cache("map cache lock poisoned".into()))?
            .clear();
        Ok(())
    }
}

/// Secret store returning fixed credentials and counting lookups.
#[derive(Debug)]
pub struct StaticSecretStore {
    credentials: Credentials,
    calls: AtomicUsize,
}

impl StaticSecretStore {
    pub fn new(username: &str, password: &str, api_base_url: Option<&str>) -> Self {
        Self {
            credentials: Credentials {
                username: username.to_string(),
                password: password.to_string(),
                api_base_url: api_base_url.map(str::to_string),
            },
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SecretStore for StaticSecretStore {
    async fn fetch_secret(&self, _secret_name: &str) -> Result<Credentials> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.credentials.clone())
    }
}

type Responder = dyn Fn(&ApiRequest) -> Result<ApiResponse> + Send + Sync;

/// Transport answering from a closure and recording every request.
pub struct ScriptedTransport {
    responder: Box<Responder>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new(
        responder: impl Fn(&ApiRequest) -> Result<ApiResponse> + Send + Sync + 'static,
    ) -> Self {
        Self { responder: Box::new(responder), requests: Mutex::new(Vec::new()) }
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().map(|requests| requests.clone()).unwrap_or_default()
    }

    /// Number of recorded requests whose URL ends with `suffix`.
    pub fn count_ending_with(&self, suffix: &str) -> usize {
        self.requests().iter().filter(|request| request.url.ends_with(suffix)).count()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let response = (self.responder)(&request);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
        response
    }
}
