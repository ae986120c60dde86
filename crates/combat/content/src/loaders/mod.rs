//! Content loaders for reading combat data from files.
//!
//! Engine configuration is read from TOML, unit rosters from RON. Both
//! deserialize `combat-core` types directly through its `serde` feature.

pub mod config;
pub mod roster;

pub use config::ConfigLoader;
pub use roster::{RosterLoader, UnitSpec};

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
