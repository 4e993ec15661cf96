//! # Archivum Domain
//!
//! Value types and errors for the preservation entity API client.
//!
//! This crate contains:
//! - Domain data types (Entity, BitStreamInfo, EventAction, ...)
//! - Domain error types and Result definitions
//! - Client configuration structures
//! - Protocol constants
//!
//! ## Architecture
//! - No dependencies on other Archivum crates
//! - Only external dependencies allowed
//! - Pure value objects, no I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
