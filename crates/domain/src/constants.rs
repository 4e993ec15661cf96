//! Protocol and configuration constants
//!
//! Centralized location for values shared by the core and infrastructure
//! crates.

// Configuration defaults
pub const DEFAULT_TOKEN_CACHE_DURATION_SECS: u64 = 900;
pub const DEFAULT_PAGE_SIZE: u32 = 1000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

// Authentication
pub const LOGIN_PATH: &str = "/api/accesstoken/login";
pub const ACCESS_TOKEN_HEADER: &str = "Preservica-Access-Token";

// Entity API
pub const ENTITY_API_PATH: &str = "/api/entity";
pub const XIP_NAMESPACE_PREFIX: &str = "http://preservica.com/XIP/v";
pub const ENTITY_API_NAMESPACE_PREFIX: &str = "http://preservica.com/EntityAPI/v";
pub const DEFAULT_API_VERSION: &str = "7.7";

// Cache key prefixes
pub const TOKEN_CACHE_PREFIX: &str = "token";
pub const SECRET_CACHE_PREFIX: &str = "secret";
