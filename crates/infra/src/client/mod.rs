//! High-level API clients

pub mod entity_client;

pub use entity_client::EntityClient;
