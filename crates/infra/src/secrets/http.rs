//! Remote secret store over HTTP
//!
//! `GET {endpoint}/secrets/{name}` returning
//! `{"username": "...", "password": "...", "apiUrl": "..."}`.

use std::sync::Arc;

use archivum_core::secret_ports::SecretStore;
use archivum_core::transport_ports::{ApiRequest, HttpMethod, Transport};
use archivum_domain::{ArchivumError, Credentials, Result};
use async_trait::async_trait;
use tracing::{debug, instrument};

pub struct HttpSecretStore {
    endpoint: String,
    transport: Arc<dyn Transport>,
}

impl HttpSecretStore {
    pub fn new(endpoint: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        Self { endpoint, transport }
    }

    pub fn secret_url(&self, secret_name: &str) -> String {
        let name: String = url::form_urlencoded::byte_serialize(secret_name.as_bytes()).collect();
        format!("{}/secrets/{name}", self.endpoint)
    }
}

#[async_trait]
impl SecretStore for HttpSecretStore {
    #[instrument(skip(self))]
    async fn fetch_secret(&self, secret_name: &str) -> Result<Credentials> {
        let url = self.secret_url(secret_name);
        let response = self
            .transport
            .send(ApiRequest::get(&url).header("Accept", "application/json"))
            .await
            .map_err(|err| ArchivumError::Secret(format!("secret '{secret_name}': {err}")))?;

        let response = response.error_for_status(HttpMethod::Get, &url).map_err(|err| {
            ArchivumError::Secret(format!("secret '{secret_name}' could not be fetched: {err}"))
        })?;

        let credentials: Credentials = serde_json::from_slice(&response.body).map_err(|err| {
            ArchivumError::Secret(format!("secret '{secret_name}' is not valid credentials JSON: {err}"))
        })?;

        debug!(has_api_url = credentials.api_base_url.is_some(), "secret fetched");
        Ok(credentials)
    }
}
