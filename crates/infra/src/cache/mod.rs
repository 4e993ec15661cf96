//! Cache store implementations
//!
//! - [`FileCache`]: shared on-disk cache that survives restarts
//! - [`MemoryCache`]: per-process cache

pub mod file_cache;
pub mod memory_cache;

pub use file_cache::{cache_file_name, default_cache_dir, FileCache, CACHE_FILE_PREFIX};
pub use memory_cache::MemoryCache;
