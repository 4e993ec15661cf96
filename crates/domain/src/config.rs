//! Client configuration structures

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_PAGE_SIZE, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_TOKEN_CACHE_DURATION_SECS,
};
use crate::{ArchivumError, Result};

/// HTTP proxy to route API traffic through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyConfig {
    pub host: String,
    pub port: u16,
}

impl ProxyConfig {
    pub fn url(&self) -> String {
        if self.host.contains("://") {
            format!("{}:{}", self.host, self.port)
        } else {
            format!("http://{}:{}", self.host, self.port)
        }
    }
}

/// Everything the client core needs to talk to one API instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// API base URL. When absent it is read from the secret.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Name of the secret holding the login credentials.
    pub secret_name: String,

    /// How long issued tokens (and fetched credentials) stay cached.
    #[serde(default = "default_token_cache_duration_secs")]
    pub token_cache_duration_secs: u64,

    /// Override for the secret store endpoint.
    #[serde(default)]
    pub secrets_endpoint: Option<String>,

    #[serde(default)]
    pub proxy: Option<ProxyConfig>,

    /// Directory for the on-disk cache. Defaults to a folder under the
    /// system temp directory.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,

    /// `max` query parameter sent to paginated endpoints.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Optional safety bound on pages followed by a single listing.
    #[serde(default)]
    pub max_pages: Option<u32>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_token_cache_duration_secs() -> u64 {
    DEFAULT_TOKEN_CACHE_DURATION_SECS
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl ClientConfig {
    pub fn new(secret_name: impl Into<String>) -> Self {
        Self {
            base_url: None,
            secret_name: secret_name.into(),
            token_cache_duration_secs: DEFAULT_TOKEN_CACHE_DURATION_SECS,
            secrets_endpoint: None,
            proxy: None,
            cache_dir: None,
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: None,
            timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn token_cache_duration(&self) -> Duration {
        Duration::from_secs(self.token_cache_duration_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Reject configurations the client cannot work with.
    ///
    /// # Errors
    /// Returns `ArchivumError::Config` describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.secret_name.trim().is_empty() {
            return Err(ArchivumError::Config("secret name must not be empty".into()));
        }
        if self.page_size == 0 {
            return Err(ArchivumError::Config("page size must be greater than zero".into()));
        }
        if self.max_pages == Some(0) {
            return Err(ArchivumError::Config("max pages must be greater than zero".into()));
        }
        if let Some(base_url) = &self.base_url {
            if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
                return Err(ArchivumError::Config(format!(
                    "base URL must be http(s), got '{base_url}'"
                )));
            }
        }
        Ok(())
    }
}
