//! # Archivum Infrastructure
//!
//! Infrastructure implementations of the core ports.
//!
//! This crate contains:
//! - The reqwest HTTP transport
//! - File and in-memory TTL cache stores
//! - Secret stores (HTTP endpoint, environment)
//! - The XML mapper for entity API documents
//! - [`EntityClient`], the entry point for callers
//!
//! ## Architecture
//! - Implements traits defined in `archivum-core`
//! - Contains all "impure" code (network, filesystem)

pub mod cache;
pub mod client;
pub mod config;
pub mod errors;
pub mod http;
pub mod secrets;
pub mod xml;

// Re-export commonly used items
pub use cache::{FileCache, MemoryCache};
pub use client::EntityClient;
pub use errors::InfraError;
pub use http::HttpClient;
pub use secrets::{EnvSecretStore, HttpSecretStore};
