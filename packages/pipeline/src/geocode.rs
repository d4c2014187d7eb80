//! Geocode stage: coordinates for every canonical location.
//!
//! Groups the standardization store by canonical value (one lookup per
//! unique canonical, however many raw variants map to it), geocodes the
//! ones not yet in the output store, and regenerates the CSV export and
//! the raw-string reverse index from the full store.
//!
//! Lookup failures are not recorded; the canonical stays absent so the
//! next run retries it.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use indexmap::IndexMap;
use talent_map_batch::progress::ProgressCallback;
use talent_map_batch::{RunSummary, StepOutcome, run_resumable};
use talent_map_location_models::{GeocodedLocation, ReverseMapping, Standardization};
use talent_map_store::MapStore;

use crate::{LocationApi, PipelineError};

/// Geocodes every canonical location and rewrites the derived exports.
///
/// # Errors
///
/// Returns [`PipelineError`] if the standardization store is missing or
/// malformed, or any output write fails. Per-item lookup failures never
/// abort the run.
pub async fn run_geocode(
    api: &dyn LocationApi,
    standardized_path: &Path,
    geocoded_path: &Path,
    csv_path: &Path,
    reverse_path: &Path,
    delay: Duration,
    limit: Option<usize>,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<RunSummary, PipelineError> {
    let standardized: MapStore<Standardization> = MapStore::load_required(standardized_path)?;

    // canonical → raw variants, first-seen order.
    let mut groups: IndexMap<String, Vec<String>> = IndexMap::new();
    for (raw, value) in &standardized {
        if let Some(canonical) = value.as_canonical() {
            groups
                .entry(canonical.to_string())
                .or_default()
                .push(raw.clone());
        }
    }
    log::info!(
        "{} unique canonical locations across {} entries",
        groups.len(),
        standardized.len()
    );

    let mut geocoded: MapStore<GeocodedLocation> = MapStore::load(geocoded_path)?;

    let canonicals: Vec<String> = groups.keys().cloned().collect();
    let summary = run_resumable(
        canonicals,
        &mut geocoded,
        delay,
        limit,
        progress,
        |canonical| {
            let variants = groups.get(&canonical).cloned().unwrap_or_default();
            async move {
                match api.coordinates(&canonical).await {
                    Ok(Some(hit)) => StepOutcome::Record(GeocodedLocation {
                        lat: hit.lat,
                        lng: hit.lng,
                        display_name: hit.display_name,
                        importance: hit.importance,
                        original_count: variants.len(),
                        original_locations: variants,
                    }),
                    Ok(None) => {
                        log::warn!("No coordinates for: {canonical}");
                        StepOutcome::Skip
                    }
                    Err(e) => {
                        log::warn!("Geocoding failed for {canonical}: {e}");
                        StepOutcome::Skip
                    }
                }
            }
        },
    )
    .await?;

    write_csv(csv_path, &geocoded)?;
    write_reverse_index(reverse_path, &standardized, &geocoded)?;

    log::info!(
        "Geocode run: {} attempted, {} ok, {} failed; {} total in store",
        summary.processed,
        summary.succeeded,
        summary.skipped,
        geocoded.len()
    );
    Ok(summary)
}

/// Writes the flat CSV export for mapping tools.
fn write_csv(path: &Path, geocoded: &MapStore<GeocodedLocation>) -> Result<(), PipelineError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        "standardized_location",
        "latitude",
        "longitude",
        "display_name",
        "importance",
        "original_count",
        "original_locations",
    ])?;

    for (canonical, location) in geocoded {
        writer.write_record([
            canonical.as_str(),
            &location.lat.to_string(),
            &location.lng.to_string(),
            &location.display_name,
            &location.importance.to_string(),
            &location.original_count.to_string(),
            &location.original_locations.join("; "),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Regenerates the raw-string reverse index from scratch: every raw
/// variant whose canonical has coordinates gets a row.
fn write_reverse_index(
    path: &Path,
    standardized: &MapStore<Standardization>,
    geocoded: &MapStore<GeocodedLocation>,
) -> Result<(), PipelineError> {
    let mut reverse: IndexMap<String, ReverseMapping> = IndexMap::new();

    for (raw, value) in standardized {
        if let Some(canonical) = value.as_canonical()
            && let Some(location) = geocoded.get(canonical)
        {
            reverse.insert(
                raw.clone(),
                ReverseMapping {
                    standardized_location: canonical.to_string(),
                    lat: location.lat,
                    lng: location.lng,
                    display_name: location.display_name.clone(),
                },
            );
        }
    }

    let mut store: MapStore<ReverseMapping> = MapStore::empty(path);
    store.replace_all(reverse);
    store.flush()?;
    Ok(())
}
