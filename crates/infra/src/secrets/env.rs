//! Secret store backed by environment variables
//!
//! For secret `prod-archive` the store reads
//! `ARCHIVUM_SECRET_PROD_ARCHIVE_USERNAME`, `..._PASSWORD` and the optional
//! `..._API_URL`.

use archivum_core::secret_ports::SecretStore;
use archivum_domain::{ArchivumError, Credentials, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

const ENV_PREFIX: &str = "ARCHIVUM_SECRET_";

static NON_ALNUM: Lazy<Regex> =
    Lazy::new(|| Regex::new("[^A-Za-z0-9]+").expect("NON_ALNUM should compile - this is a bug"));

#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSecretStore;

impl EnvSecretStore {
    pub fn new() -> Self {
        Self
    }

    /// Environment variable prefix for `secret_name`.
    pub fn variable_prefix(secret_name: &str) -> String {
        let normalized = NON_ALNUM.replace_all(secret_name.trim(), "_").to_ascii_uppercase();
        format!("{ENV_PREFIX}{normalized}_")
    }
}

fn read(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

#[async_trait]
impl SecretStore for EnvSecretStore {
    async fn fetch_secret(&self, secret_name: &str) -> Result<Credentials> {
        let prefix = Self::variable_prefix(secret_name);
        let required = |field: &str| {
            let name = format!("{prefix}{field}");
            read(&name).ok_or_else(|| {
                ArchivumError::Secret(format!("secret '{secret_name}': {name} is not set"))
            })
        };

        Ok(Credentials {
            username: required("USERNAME")?,
            password: required("PASSWORD")?,
            api_base_url: read(&format!("{prefix}API_URL")),
        })
    }
}
