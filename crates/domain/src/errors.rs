//! Error types used throughout the client

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound on how much of an offending XML document is embedded in an
/// error message.
pub const MAX_FRAGMENT_CHARS: usize = 2_000;

/// Coarse classification of client errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Non-2xx response from a business endpoint
    Http,
    /// Login failed or the server rejected the access token
    Authentication,
    /// Connection, timeout or transport-level failure
    Network,
    /// Response did not have the expected XML/JSON shape
    Response,
    /// Local environment problem (cache directory, configuration)
    Environment,
    /// Caller passed something the API cannot accept
    Input,
}

/// Main error type for Archivum
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail")]
pub enum ArchivumError {
    #[error("{method} {url} returned status {status}{}", body_suffix(.body))]
    Http { method: String, url: String, status: u16, body: Option<String> },

    #[error("Authentication failed for {method} {url}{}: {reason}", status_suffix(.status))]
    Auth { method: String, url: String, status: Option<u16>, reason: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("{message}\n{fragment}")]
    Xml { message: String, fragment: String },

    #[error("Unexpected response: {0}")]
    Response(String),

    #[error("Secret store error: {0}")]
    Secret(String),

    #[error("Pagination error: {0}")]
    Pagination(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// A wire value that matches no variant of the enum it was parsed into.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unrecognized {kind} '{value}'")]
pub struct UnknownWireValue {
    pub kind: &'static str,
    pub value: String,
}

impl From<UnknownWireValue> for ArchivumError {
    fn from(err: UnknownWireValue) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

impl ArchivumError {
    /// Build an XML shape error, truncating the embedded fragment.
    pub fn xml(message: impl Into<String>, fragment: &str) -> Self {
        Self::Xml { message: message.into(), fragment: truncate_fragment(fragment) }
    }

    /// Category used by callers deciding whether to retry.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Http { status: 401, .. } | Self::Auth { .. } => ErrorCategory::Authentication,
            Self::Http { .. } => ErrorCategory::Http,
            Self::Network(_) => ErrorCategory::Network,
            Self::Xml { .. } | Self::Response(_) | Self::Pagination(_) => ErrorCategory::Response,
            Self::Cache(_) | Self::Secret(_) | Self::Config(_) | Self::Internal(_) => {
                ErrorCategory::Environment
            }
            Self::InvalidInput(_) => ErrorCategory::Input,
        }
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Auth { status, .. } => *status,
            _ => None,
        }
    }
}

fn body_suffix(body: &Option<String>) -> String {
    match body.as_deref() {
        Some(body) if !body.is_empty() => format!(": {body}"),
        _ => String::new(),
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (status {s})")).unwrap_or_default()
}

fn truncate_fragment(fragment: &str) -> String {
    let trimmed = fragment.trim();
    match trimmed.char_indices().nth(MAX_FRAGMENT_CHARS) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}

/// Result type alias for Archivum operations
pub type Result<T> = std::result::Result<T, ArchivumError>;
