//! Retry pass: re-attempt the entries the primary pass marked `FAILED`.
//!
//! Runs the exact same lookup-and-canonicalize step as the primary
//! pass, but over the currently failed keys, updating them in place.
//! Successes overwrite the `FAILED` value at the key's existing
//! position; entries that fail again are left untouched.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use talent_map_batch::progress::ProgressCallback;
use talent_map_geocoder::canonical::canonicalize;
use talent_map_location_models::Standardization;
use talent_map_store::mirror::write_standardization_mirror;
use talent_map_store::{MapStore, paths};

use crate::{LocationApi, PipelineError};

/// Counts from one retry run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetrySummary {
    /// Failed entries attempted this run.
    pub attempted: usize,
    /// Entries upgraded to a canonical value.
    pub recovered: usize,
    /// Entries that failed again.
    pub still_failed: usize,
}

/// Retries every `FAILED` entry in the standardization store.
///
/// The store is flushed after each attempt, so an interrupted retry
/// keeps its recoveries. The text mirror is rewritten afterwards.
///
/// # Errors
///
/// Returns [`PipelineError`] if the store is missing, malformed, or
/// cannot be flushed. Per-item lookup failures never abort the run.
pub async fn run_retry(
    api: &dyn LocationApi,
    store_path: &Path,
    delay: Duration,
    limit: Option<usize>,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<RetrySummary, PipelineError> {
    let mut store: MapStore<Standardization> = MapStore::load_required(store_path)?;

    let mut failed: Vec<String> = store
        .iter()
        .filter(|(_, value)| value.is_failed())
        .map(|(key, _)| key.clone())
        .collect();
    log::info!(
        "Found {} FAILED entries of {} in {}",
        failed.len(),
        store.len(),
        store_path.display()
    );

    if failed.is_empty() {
        log::info!("No failed entries; nothing to retry");
        return Ok(RetrySummary::default());
    }

    if let Some(limit) = limit
        && limit < failed.len()
    {
        log::info!("Limiting to {limit} retry attempts");
        failed.truncate(limit);
    }

    progress.set_total(failed.len() as u64);

    let mut summary = RetrySummary::default();
    for raw in failed {
        progress.set_message(raw.clone());
        summary.attempted += 1;

        let canonical = match api.place(&raw).await {
            Ok(Some(hit)) => canonicalize(&hit),
            Ok(None) => None,
            Err(e) => {
                log::warn!("Lookup failed for {raw}: {e}");
                None
            }
        };

        if let Some(canonical) = canonical {
            log::debug!("Recovered: {raw} → {canonical}");
            store.insert(raw, Standardization::Canonical(canonical));
            summary.recovered += 1;
        } else {
            log::debug!("Still failed: {raw}");
            summary.still_failed += 1;
        }

        store.flush()?;
        progress.inc(1);

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    store.flush()?;
    write_standardization_mirror(&paths::text_mirror_path(store_path), store.entries())?;
    progress.finish(format!(
        "{} attempted, {} recovered, {} still failed",
        summary.attempted, summary.recovered, summary.still_failed
    ));

    Ok(summary)
}
