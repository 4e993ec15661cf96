//! Authenticated request dispatch
//!
//! [`ApiSession`] attaches the access token to every business request and
//! turns non-2xx responses into errors. A 401 invalidates the cached token
//! so the next call logs in again; the failing call itself is not retried.

use std::sync::Arc;

use archivum_domain::constants::ACCESS_TOKEN_HEADER;
use archivum_domain::{Page, Result};
use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use crate::auth::AccessTokenProvider;
use crate::pagination::{self, PageSource};
use crate::transport_ports::{ApiRequest, ApiResponse, Transport};

pub struct ApiSession {
    transport: Arc<dyn Transport>,
    auth: Arc<dyn AccessTokenProvider>,
    max_pages: Option<u32>,
}

impl ApiSession {
    pub fn new(
        transport: Arc<dyn Transport>,
        auth: Arc<dyn AccessTokenProvider>,
        max_pages: Option<u32>,
    ) -> Self {
        Self { transport, auth, max_pages }
    }

    pub fn auth(&self) -> &Arc<dyn AccessTokenProvider> {
        &self.auth
    }

    /// Send `request` with the access token attached.
    ///
    /// # Errors
    /// Returns the token provider's error, a transport error, or
    /// `ArchivumError::Http` for any non-2xx status.
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let token = self.auth.access_token().await?;
        let method = request.method;
        let url = request.url.clone();

        let response = self
            .transport
            .send(request.header(ACCESS_TOKEN_HEADER, token.as_str()))
            .await?;

        if response.status == 401 {
            warn!(url = %url, "access token rejected, invalidating");
            if let Err(err) = self.auth.invalidate().await {
                warn!(error = %err, "failed to invalidate access token");
            }
        }

        let response = response.error_for_status(method, &url)?;
        debug!(status = response.status, bytes = response.body.len(), "request completed");
        Ok(response)
    }

    /// GET `url` and return the body as text.
    pub async fn get_text(&self, url: &str) -> Result<String> {
        Ok(self.send(ApiRequest::get(url)).await?.text())
    }

    /// Drain a paginated listing through this session.
    pub async fn drain<T, P>(&self, first_url: &str, parse_page: P) -> Result<Vec<T>>
    where
        P: FnMut(&str) -> Result<Page<T>> + Send,
        T: Send,
    {
        pagination::drain(self, first_url, self.max_pages, parse_page).await
    }
}

#[async_trait]
impl PageSource for ApiSession {
    async fn fetch_page(&self, url: &str) -> Result<String> {
        self.get_text(url).await
    }
}
