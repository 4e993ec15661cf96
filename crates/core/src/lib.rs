//! # Archivum Core
//!
//! Client logic for the entity API - no HTTP library or filesystem code.
//!
//! This crate contains:
//! - Port interfaces for transport, caching and secret lookup
//! - The access token lifecycle
//! - Pagination draining and the authenticated request session
//!
//! ## Architecture Principles
//! - Only depends on `archivum-domain`
//! - All I/O goes through the traits in the `*_ports` modules
//! - Time is injected through [`time::Clock`]

pub mod auth;
pub mod pagination;
pub mod session;
pub mod time;

// Infrastructure ports
pub mod cache_ports;
pub mod secret_ports;
pub mod transport_ports;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use auth::{
    resolve_base_url, AccessTokenProvider, CachedSecretStore, TokenManager, TokenManagerConfig,
    TokenState,
};
pub use cache_ports::CacheStore;
pub use pagination::{drain, PageSource};
pub use secret_ports::SecretStore;
pub use session::ApiSession;
pub use time::{Clock, MockClock, SystemClock};
pub use transport_ports::{ApiRequest, ApiResponse, HttpMethod, Transport};
