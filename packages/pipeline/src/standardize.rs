//! Primary standardization pass: raw strings through the structured
//! geocoder.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use talent_map_batch::progress::ProgressCallback;
use talent_map_batch::{RunSummary, StepOutcome, run_resumable};
use talent_map_extract::ExtractedLocations;
use talent_map_geocoder::canonical::canonicalize;
use talent_map_location_models::Standardization;
use talent_map_store::mirror::write_standardization_mirror;
use talent_map_store::{MapStore, paths};

use crate::{LocationApi, PipelineError};

/// Reads the seed location list out of the extraction artifact.
///
/// # Errors
///
/// Returns [`PipelineError`] if the artifact is missing or malformed.
pub fn load_seed_locations(artifact_path: &Path) -> Result<Vec<String>, PipelineError> {
    let contents = fs::read_to_string(artifact_path)?;
    let extracted: ExtractedLocations = serde_json::from_str(&contents)
        .map_err(talent_map_store::StoreError::Json)?;
    Ok(extracted.locations)
}

/// Standardizes every seed location not yet in the store.
///
/// Each raw string goes through a structured lookup and canonical
/// assembly; strings the provider cannot place (or that error out) are
/// recorded as `FAILED` so the fallback pass can pick them up. The
/// human-readable text mirror is rewritten afterwards.
///
/// # Errors
///
/// Returns [`PipelineError`] if the store cannot be loaded or flushed.
/// Per-item lookup failures never abort the run.
pub async fn run_standardize(
    api: &dyn LocationApi,
    locations: Vec<String>,
    store_path: &Path,
    delay: Duration,
    limit: Option<usize>,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<RunSummary, PipelineError> {
    let mut store: MapStore<Standardization> = MapStore::load(store_path)?;
    log::info!(
        "Standardizing {} locations into {}",
        locations.len(),
        store_path.display()
    );

    let summary = run_resumable(locations, &mut store, delay, limit, progress, |raw| async move {
        match api.place(&raw).await {
            Ok(Some(hit)) => canonicalize(&hit).map_or_else(
                || {
                    log::warn!("No canonical form for: {raw}");
                    StepOutcome::RecordFailure(Standardization::Failed)
                },
                |canonical| StepOutcome::Record(Standardization::Canonical(canonical)),
            ),
            Ok(None) => {
                log::warn!("No match for: {raw}");
                StepOutcome::RecordFailure(Standardization::Failed)
            }
            Err(e) => {
                log::warn!("Lookup failed for {raw}: {e}");
                StepOutcome::RecordFailure(Standardization::Failed)
            }
        }
    })
    .await?;

    write_standardization_mirror(&paths::text_mirror_path(store_path), store.entries())?;

    log::info!(
        "Standardization run: {} processed, {} ok, {} failed",
        summary.processed,
        summary.succeeded,
        summary.failed
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;
    use talent_map_batch::progress::null_progress;
    use talent_map_geocoder::{AddressDetails, CoordinateMatch, GeocodeError, PlaceMatch};

    use super::*;

    struct CannedApi {
        places: HashMap<String, PlaceMatch>,
        coords: HashMap<String, CoordinateMatch>,
    }

    impl CannedApi {
        fn with_places(entries: &[(&str, &str, &str, &str)]) -> Self {
            let places = entries
                .iter()
                .map(|(query, city, state, country)| {
                    (
                        (*query).to_string(),
                        PlaceMatch {
                            display_name: format!("{city}, {state}, {country}"),
                            address: AddressDetails {
                                city: Some((*city).to_string()),
                                state: Some((*state).to_string()),
                                country: Some((*country).to_string()),
                                ..AddressDetails::default()
                            },
                            latitude: 0.0,
                            longitude: 0.0,
                            importance: 0.5,
                        },
                    )
                })
                .collect();
            Self {
                places,
                coords: HashMap::new(),
            }
        }
    }

    #[async_trait]
    impl LocationApi for CannedApi {
        async fn place(&self, query: &str) -> Result<Option<PlaceMatch>, GeocodeError> {
            Ok(self.places.get(query).cloned())
        }

        async fn coordinates(&self, query: &str) -> Result<Option<CoordinateMatch>, GeocodeError> {
            Ok(self.coords.get(query).cloned())
        }
    }

    fn seeds(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[tokio::test]
    async fn records_canonicals_and_failures() {
        let dir = tempfile::tempdir().unwrap();
        let store_path = dir.path().join("standardized_locations.json");
        let api = CannedApi::with_places(&[("Austin TX", "Austin", "Texas", "United States")]);

        let summary = run_standardize(
            &api,
            seeds(&["Austin TX", "gibberish"]),
            &store_path,
            Duration::ZERO,
            None,
            &null_progress(),
        )
        .await
        .unwrap();

        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 1);

        let store: MapStore<Standardization> = MapStore::load(&store_path).unwrap();
        assert_eq!(
            store.get("Austin TX"),
            Some(&Standardization::Canonical(
                "Austin, Texas, United States".to_string()
            ))
        );
        assert_eq!(store.get("gibberish"), Some(&Standardization::Failed));

        let mirror = fs::read_to_string(dir.path().join("standardized_locations.txt")).unwrap();
        assert!(mirror.contains("Austin TX → Austin, Texas, United States"));
        assert!(mirror.contains("gibberish → FAILED"));
    }

    #[tokio::test]
    async fn rerun_skips_already_standardized() {
        let dir = tempfile::tempdir().unwrap();
        let store_path = dir.path().join("standardized_locations.json");
        let api = CannedApi::with_places(&[("Austin TX", "Austin", "Texas", "United States")]);

        let input = seeds(&["Austin TX"]);
        run_standardize(
            &api,
            input.clone(),
            &store_path,
            Duration::ZERO,
            None,
            &null_progress(),
        )
        .await
        .unwrap();

        let summary = run_standardize(
            &api,
            input,
            &store_path,
            Duration::ZERO,
            None,
            &null_progress(),
        )
        .await
        .unwrap();
        assert_eq!(summary.processed, 0);
    }

    #[test]
    fn seed_list_loads_from_extraction_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batch_locations.json");
        fs::write(
            &path,
            r#"{
                "metadata": {
                    "total_locations_extracted": 3,
                    "unique_locations": 2,
                    "batch_files_processed": 1,
                    "batch_range": "001-001"
                },
                "locations": ["Austin, TX", "Berlin"],
                "location_frequency": {"Austin, TX": 2, "Berlin": 1}
            }"#,
        )
        .unwrap();

        let seeds = load_seed_locations(&path).unwrap();
        assert_eq!(seeds, vec!["Austin, TX", "Berlin"]);
    }
}
