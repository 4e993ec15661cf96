//! Configuration loader
//!
//! Loads client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If `ARCHIVUM_SECRET_NAME` is not set, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `ARCHIVUM_SECRET_NAME`: Secret holding the login credentials (required)
//! - `ARCHIVUM_BASE_URL`: API base URL
//! - `ARCHIVUM_TOKEN_CACHE_DURATION`: Token cache duration in seconds
//! - `ARCHIVUM_SECRETS_ENDPOINT`: Secret store endpoint override
//! - `ARCHIVUM_PROXY_HOST` / `ARCHIVUM_PROXY_PORT`: HTTP proxy
//! - `ARCHIVUM_CACHE_DIR`: Directory for the on-disk cache
//! - `ARCHIVUM_PAGE_SIZE`: Page size for listings
//! - `ARCHIVUM_MAX_PAGES`: Upper bound on pages per listing
//! - `ARCHIVUM_TIMEOUT`: Request timeout in seconds
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./archivum.json` or `./archivum.toml` (current working directory)
//! 2. `./config.json` or `./config.toml` (current working directory)
//! 3. `../archivum.json` or `../archivum.toml` (parent directory)
//! 4. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use archivum_domain::{ArchivumError, ClientConfig, ProxyConfig, Result};

const SECRET_NAME_VAR: &str = "ARCHIVUM_SECRET_NAME";

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If the required
/// variable is missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `ArchivumError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Values fail validation
pub fn load() -> Result<ClientConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// Only `ARCHIVUM_SECRET_NAME` is required; every other setting falls back
/// to its default.
///
/// # Errors
/// Returns `ArchivumError::Config` if the secret name is missing, a value
/// cannot be parsed, or the result fails validation.
pub fn load_from_env() -> Result<ClientConfig> {
    let mut config = ClientConfig::new(env_var(SECRET_NAME_VAR)?);

    config.base_url = env_opt("ARCHIVUM_BASE_URL");
    config.secrets_endpoint = env_opt("ARCHIVUM_SECRETS_ENDPOINT");
    config.cache_dir = env_opt("ARCHIVUM_CACHE_DIR").map(PathBuf::from);
    config.max_pages = env_parse("ARCHIVUM_MAX_PAGES")?;

    if let Some(secs) = env_parse("ARCHIVUM_TOKEN_CACHE_DURATION")? {
        config.token_cache_duration_secs = secs;
    }
    if let Some(page_size) = env_parse("ARCHIVUM_PAGE_SIZE")? {
        config.page_size = page_size;
    }
    if let Some(timeout) = env_parse("ARCHIVUM_TIMEOUT")? {
        config.timeout_secs = timeout;
    }

    config.proxy = match (env_opt("ARCHIVUM_PROXY_HOST"), env_parse::<u16>("ARCHIVUM_PROXY_PORT")?) {
        (Some(host), Some(port)) => Some(ProxyConfig { host, port }),
        (None, None) => None,
        _ => {
            return Err(ArchivumError::Config(
                "ARCHIVUM_PROXY_HOST and ARCHIVUM_PROXY_PORT must be set together".to_string(),
            ))
        }
    };

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Arguments
/// * `path` - Optional path to config file. If `None`, uses
///   [`probe_config_paths`].
///
/// # Errors
/// Returns `ArchivumError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Values fail validation
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ArchivumError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            ArchivumError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| ArchivumError::Config(format!("Failed to read config file: {}", e)))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
///
/// # Errors
/// Returns `ArchivumError::Config` if format is invalid or parsing fails.
fn parse_config(contents: &str, path: &Path) -> Result<ClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| ArchivumError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| ArchivumError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(ArchivumError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(candidate_files(&cwd));
        candidates.extend(candidate_files(&cwd.join("..")));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(candidate_files(exe_dir));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn candidate_files(dir: &Path) -> Vec<PathBuf> {
    ["archivum.json", "archivum.toml", "config.json", "config.toml"]
        .iter()
        .map(|name| dir.join(name))
        .collect()
}

/// Get required environment variable
///
/// # Errors
/// Returns `ArchivumError::Config` if the variable is not set.
fn env_var(key: &str) -> Result<String> {
    env_opt(key).ok_or_else(|| {
        ArchivumError::Config(format!("Missing required environment variable: {}", key))
    })
}

/// Non-empty environment variable, if set.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Parse an optional environment variable.
///
/// # Errors
/// Returns `ArchivumError::Config` if the variable is set but unparseable.
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_opt(key)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| ArchivumError::Config(format!("Invalid value for {}: {}", key, e)))
        })
        .transpose()
}
