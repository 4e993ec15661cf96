//! Transport port interfaces
//!
//! The core never talks to the network directly. It builds [`ApiRequest`]
//! values and hands them to a [`Transport`]; retries, pooling, TLS and
//! proxies are the transport's business.

use async_trait::async_trait;
use archivum_domain::{ArchivumError, Result};

/// HTTP verbs used by the entity API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outgoing request, independent of any HTTP library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl ApiRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self { method, url: url.into(), headers: Vec::new(), body: None }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, url)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, url)
    }

    /// Add or replace a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
        self
    }

    /// Attach an XML body.
    pub fn xml_body(self, xml: impl Into<String>) -> Self {
        let mut request = self.header("Content-Type", "application/xml;charset=UTF-8");
        request.body = Some(xml.into().into_bytes());
        request
    }

    /// Attach a `application/x-www-form-urlencoded` body.
    pub fn form_body(self, fields: &[(&str, &str)]) -> Self {
        let encoded = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields.iter().copied())
            .finish();
        let mut request = self.header("Content-Type", "application/x-www-form-urlencoded");
        request.body = Some(encoded.into_bytes());
        request
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Response as returned by the transport, before any status checking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self { status, headers: Vec::new(), body: body.into() }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Turn a non-2xx response into `ArchivumError::Http`.
    ///
    /// # Errors
    /// Returns the error carrying method, URL, status and body.
    pub fn error_for_status(self, method: HttpMethod, url: &str) -> Result<Self> {
        if self.is_success() {
            return Ok(self);
        }
        let body = self.text();
        Err(ArchivumError::Http {
            method: method.to_string(),
            url: url.to_string(),
            status: self.status,
            body: if body.is_empty() { None } else { Some(body) },
        })
    }
}

/// Capability to send a request and receive a response.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request. Non-2xx statuses are returned as responses, not
    /// errors; only transport faults (connect, timeout) are errors.
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse>;
}
