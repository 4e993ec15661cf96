//! Credentials and access tokens
//!
//! Neither type prints its secret material through `Debug`.

use serde::{Deserialize, Serialize};

/// Login credentials resolved from a secret store.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    /// Base URL of the API the credentials belong to, when the secret
    /// carries one.
    #[serde(rename = "apiUrl", default, skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

/// Opaque access token issued by the login endpoint.
///
/// No expiry is read from the token itself; the cache TTL decides staleness.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}
