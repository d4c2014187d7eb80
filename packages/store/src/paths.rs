#![allow(clippy::module_name_repetitions)]
//! Canonical file paths for the `data/` directory.
//!
//! All pipeline artifacts live under the project root's `data/`
//! directory; no component hardcodes a path outside this module.

use std::path::{Path, PathBuf};

/// Returns the workspace root directory.
///
/// Resolved at compile time from `CARGO_MANIFEST_DIR`.
///
/// # Panics
///
/// Panics if the project root cannot be resolved.
#[must_use]
pub fn project_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .expect("Failed to find project root from CARGO_MANIFEST_DIR")
        .to_path_buf()
}

/// Returns the `data/` directory path.
#[must_use]
pub fn data_dir() -> PathBuf {
    project_root().join("data")
}

/// Returns the extraction artifact path (unique locations + frequency).
#[must_use]
pub fn batch_locations_path() -> PathBuf {
    data_dir().join("batch_locations.json")
}

/// Returns the primary standardization store path (`raw → canonical`).
#[must_use]
pub fn standardized_locations_path() -> PathBuf {
    data_dir().join("standardized_locations.json")
}

/// Returns the pre-merge backup snapshot path.
#[must_use]
pub fn standardized_backup_path() -> PathBuf {
    data_dir().join("standardized_locations_backup.json")
}

/// Returns the LLM fallback results store path.
#[must_use]
pub fn fallback_locations_path() -> PathBuf {
    data_dir().join("fallback_locations.json")
}

/// Returns the geocoded locations store path.
#[must_use]
pub fn geocoded_locations_path() -> PathBuf {
    data_dir().join("geocoded_locations.json")
}

/// Returns the geocoded CSV export path.
#[must_use]
pub fn geocoded_csv_path() -> PathBuf {
    data_dir().join("geocoded_locations.csv")
}

/// Returns the regenerated reverse index path (`raw → coordinates`).
#[must_use]
pub fn geocoded_reverse_path() -> PathBuf {
    data_dir().join("geocoded_locations_reverse.json")
}

/// Returns the structured candidate profiles path.
#[must_use]
pub fn candidate_profiles_path() -> PathBuf {
    data_dir().join("candidate_profiles.json")
}

/// Returns the sibling `.txt` mirror path for a `.json` artifact.
#[must_use]
pub fn text_mirror_path(json_path: &Path) -> PathBuf {
    json_path.with_extension("txt")
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
    fn mirror_path_swaps_extension() {
        let json = Path::new("/tmp/standardized_locations.json");
        assert_eq!(
            text_mirror_path(json),
            Path::new("/tmp/standardized_locations.txt")
        );
    }
}
