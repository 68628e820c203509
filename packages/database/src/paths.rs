#![allow(clippy::module_name_repetitions)]
//! Canonical locations of the local data directory.
//!
//! Everything lives under `data/` in the workspace root unless the caller
//! supplies its own directory.

use std::path::{Path, PathBuf};

/// Returns the workspace root directory.
///
/// Resolved at compile time from `CARGO_MANIFEST_DIR`. Falls back to the
/// current directory if the manifest is not nested as expected.
#[must_use]
pub fn project_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

/// Returns the `data/` directory path.
#[must_use]
pub fn data_dir() -> PathBuf {
    project_root().join("data")
}

/// Returns the directory used by the file-backed store inside `data_dir`.
#[must_use]
pub fn store_dir_in(data_dir: &Path) -> PathBuf {
    data_dir.join("store")
}

/// Returns the `DuckDB` key-value database path inside `data_dir`.
#[must_use]
pub fn kv_db_path_in(data_dir: &Path) -> PathBuf {
    data_dir.join("safe_zone.duckdb")
}

/// Ensures a directory exists, creating it if necessary.
///
/// # Errors
///
/// Returns an I/O error if the directory cannot be created.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_under_data_dir() {
        let base = Path::new("/tmp/safe-zone");
        assert_eq!(store_dir_in(base), Path::new("/tmp/safe-zone/store"));
        assert_eq!(
            kv_db_path_in(base),
            Path::new("/tmp/safe-zone/safe_zone.duckdb")
        );
    }

    #[test]
    fn data_dir_is_inside_project_root() {
        assert!(data_dir().starts_with(project_root()));
    }
}
