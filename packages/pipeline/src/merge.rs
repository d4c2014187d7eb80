//! Merge stage: fold reviewed fallback results into the primary store.
//!
//! Snapshots the primary store before touching it, applies the pure
//! merge, and rewrites the store and its text mirror.

use std::path::Path;

use talent_map_location_models::Standardization;
use talent_map_merge::MergeCounts;
use talent_map_store::mirror::write_standardization_mirror;
use talent_map_store::{MapStore, paths};

use crate::PipelineError;

/// Merges the fallback results store into the standardization store.
///
/// A full backup of the pre-merge store is written to `backup_path`
/// first, so the merge is manually reversible.
///
/// # Errors
///
/// Returns [`PipelineError`] if either input store is missing or
/// malformed, or any write fails.
pub fn run_merge(
    standardized_path: &Path,
    fallback_path: &Path,
    backup_path: &Path,
) -> Result<MergeCounts, PipelineError> {
    let mut standardized: MapStore<Standardization> = MapStore::load_required(standardized_path)?;
    let fallback: MapStore<Standardization> = MapStore::load_required(fallback_path)?;

    log::info!(
        "Merging {} fallback results into {} entries",
        fallback.len(),
        standardized.len()
    );

    standardized.snapshot_to(backup_path)?;
    log::info!("Backup written to {}", backup_path.display());

    let (merged, counts) = talent_map_merge::merge(standardized.entries(), fallback.entries());
    standardized.replace_all(merged);
    standardized.flush()?;

    write_standardization_mirror(
        &paths::text_mirror_path(standardized_path),
        standardized.entries(),
    )?;

    log::info!(
        "Merge: {} upgraded, {} unknown, {} missing, {} failed, {} duplicates",
        counts.merged,
        counts.kept_unknown,
        counts.kept_missing,
        counts.kept_failed,
        counts.kept_duplicate
    );
    Ok(counts)
}
