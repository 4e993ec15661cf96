//! Port interfaces for credential lookup

use async_trait::async_trait;
use archivum_domain::{Credentials, Result};

/// Source of login credentials, looked up by secret name.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetch the credentials stored under `secret_name`.
    async fn fetch_secret(&self, secret_name: &str) -> Result<Credentials>;
}
