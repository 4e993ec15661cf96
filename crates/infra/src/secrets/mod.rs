//! Secret store implementations

pub mod env;
pub mod http;

pub use env::EnvSecretStore;
pub use http::HttpSecretStore;
