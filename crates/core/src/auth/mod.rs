//! Access token lifecycle
//!
//! A client instance moves through
//! `NoToken -> Authenticating -> Authenticated -> Expired -> Authenticating`.
//! The cached token's TTL is the only authority on staleness; nothing is
//! read from the token itself.

pub mod credentials;
pub mod token_manager;

use async_trait::async_trait;
use archivum_domain::{AuthToken, Result};

pub use credentials::{resolve_base_url, CachedSecretStore};
pub use token_manager::{TokenManager, TokenManagerConfig};

/// Observable state of a [`TokenManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    /// No token has been obtained yet
    NoToken,
    /// A login call is in flight
    Authenticating,
    /// The last lookup found a cached, unexpired token
    Authenticated,
    /// A previously valid token was found missing or expired
    Expired,
}

/// Trait for providing access tokens
///
/// This trait allows dependency injection and testing with mock providers.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// Get a valid access token, logging in if needed.
    async fn access_token(&self) -> Result<AuthToken>;

    /// Forget the current token so the next call logs in again.
    async fn invalidate(&self) -> Result<()>;
}
