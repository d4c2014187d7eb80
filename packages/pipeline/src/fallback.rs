//! LLM fallback pass over the entries still `FAILED` after retries.
//!
//! Collects every failed key, sends them to the model in one batch, and
//! persists the results to their own store (the primary store is only
//! touched by the merge stage, after review). A sectioned text report
//! is written next to the JSON for manual review.

use std::fs;
use std::path::Path;

use talent_map_ai::fallback::standardize_batch;
use talent_map_ai::providers::LlmProvider;
use talent_map_location_models::Standardization;
use talent_map_store::{MapStore, paths};

use crate::PipelineError;

/// Counts from one fallback run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FallbackSummary {
    /// Failed entries sent to the model.
    pub attempted: usize,
    /// Entries the model standardized.
    pub standardized: usize,
    /// Entries the model marked `UNKNOWN`.
    pub unknown: usize,
    /// Entries the model response omitted.
    pub missing: usize,
}

/// Sends every `FAILED` entry through the LLM fallback and writes the
/// results store plus its review report.
///
/// # Errors
///
/// Returns [`PipelineError`] if a store cannot be read or written, or
/// if the model call or its response parsing fails (the whole batch is
/// all-or-nothing).
pub async fn run_fallback(
    provider: &dyn LlmProvider,
    standardized_path: &Path,
    fallback_path: &Path,
) -> Result<FallbackSummary, PipelineError> {
    let standardized: MapStore<Standardization> = MapStore::load_required(standardized_path)?;

    let failed: Vec<String> = standardized
        .iter()
        .filter(|(_, value)| value.is_failed())
        .map(|(key, _)| key.clone())
        .collect();
    log::info!(
        "Found {} FAILED entries of {} in {}",
        failed.len(),
        standardized.len(),
        standardized_path.display()
    );

    if failed.is_empty() {
        log::info!("No failed entries; nothing to send to the fallback");
        return Ok(FallbackSummary::default());
    }

    let results = standardize_batch(provider, &failed).await?;

    let mut summary = FallbackSummary {
        attempted: failed.len(),
        ..FallbackSummary::default()
    };
    for outcome in results.values() {
        match outcome {
            Standardization::Canonical(_) => summary.standardized += 1,
            Standardization::Unknown => summary.unknown += 1,
            Standardization::MissingFromResponse => summary.missing += 1,
            Standardization::Failed => {}
        }
    }

    let mut store: MapStore<Standardization> = MapStore::empty(fallback_path);
    store.replace_all(results);
    store.flush()?;

    write_report(&paths::text_mirror_path(fallback_path), &store)?;

    log::info!(
        "Fallback run: {} attempted, {} standardized, {} unknown, {} missing",
        summary.attempted,
        summary.standardized,
        summary.unknown,
        summary.missing
    );
    Ok(summary)
}

/// Writes the sectioned review report: successes, unknowns, and (only
/// when present) omissions.
fn write_report(path: &Path, store: &MapStore<Standardization>) -> Result<(), PipelineError> {
    let mut out = String::new();
    out.push_str("LLM Location Standardization Results\n");
    out.push_str(&"=".repeat(50));
    out.push_str("\n\n");

    out.push_str("SUCCESSFUL STANDARDIZATIONS:\n");
    out.push_str(&"-".repeat(30));
    out.push('\n');
    for (raw, outcome) in store {
        if let Some(canonical) = outcome.as_canonical() {
            out.push_str(&format!("{raw} → {canonical}\n"));
        }
    }

    out.push_str("\nUNKNOWN LOCATIONS:\n");
    out.push_str(&"-".repeat(30));
    out.push('\n');
    for (raw, outcome) in store {
        if *outcome == Standardization::Unknown {
            out.push_str(raw);
            out.push('\n');
        }
    }

    if store
        .iter()
        .any(|(_, outcome)| *outcome == Standardization::MissingFromResponse)
    {
        out.push_str("\nMISSING FROM RESPONSE:\n");
        out.push_str(&"-".repeat(30));
        out.push('\n');
        for (raw, outcome) in store {
            if *outcome == Standardization::MissingFromResponse {
                out.push_str(raw);
                out.push('\n');
            }
        }
    }

    fs::write(path, out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use talent_map_ai::AiError;

    use super::*;

    struct CannedProvider(String);

    #[async_trait::async_trait]
    impl LlmProvider for CannedProvider {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String, AiError> {
            Ok(self.0.clone())
        }
    }

    fn seed_store(path: &Path) {
        let mut store: MapStore<Standardization> = MapStore::empty(path);
        store.insert(
            "Berlin",
            Standardization::Canonical("Berlin, Germany".to_string()),
        );
        store.insert("SF Bay Area", Standardization::Failed);
        store.insert("EMEA", Standardization::Failed);
        store.insert("nowhere", Standardization::Failed);
        store.flush().unwrap();
    }

    #[tokio::test]
    async fn writes_results_store_and_report() {
        let dir = tempfile::tempdir().unwrap();
        let standardized_path = dir.path().join("standardized_locations.json");
        let fallback_path = dir.path().join("fallback_locations.json");
        seed_store(&standardized_path);

        let provider = CannedProvider(
            r#"{"SF Bay Area": "San Francisco, California, United States of America", "EMEA": "UNKNOWN"}"#
                .to_string(),
        );

        let summary = run_fallback(&provider, &standardized_path, &fallback_path)
            .await
            .unwrap();

        assert_eq!(summary.attempted, 3);
        assert_eq!(summary.standardized, 1);
        assert_eq!(summary.unknown, 1);
        assert_eq!(summary.missing, 1);

        let store: MapStore<Standardization> = MapStore::load(&fallback_path).unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(
            store.get("nowhere"),
            Some(&Standardization::MissingFromResponse)
        );
        // Only failed entries go out; successes stay out of the batch.
        assert!(!store.contains_key("Berlin"));

        let report = fs::read_to_string(dir.path().join("fallback_locations.txt")).unwrap();
        assert!(report.contains(
            "SF Bay Area → San Francisco, California, United States of America"
        ));
        assert!(report.contains("UNKNOWN LOCATIONS:\n------------------------------\nEMEA"));
        assert!(report.contains("MISSING FROM RESPONSE:"));
    }

    #[tokio::test]
    async fn no_failed_entries_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let standardized_path = dir.path().join("standardized_locations.json");
        let fallback_path = dir.path().join("fallback_locations.json");

        let mut store: MapStore<Standardization> = MapStore::empty(&standardized_path);
        store.insert(
            "Berlin",
            Standardization::Canonical("Berlin, Germany".to_string()),
        );
        store.flush().unwrap();

        let provider = CannedProvider("should never be called".to_string());
        let summary = run_fallback(&provider, &standardized_path, &fallback_path)
            .await
            .unwrap();

        assert_eq!(summary, FallbackSummary::default());
        assert!(!fallback_path.exists());
    }

    #[tokio::test]
    async fn unparseable_completion_fails_the_stage() {
        let dir = tempfile::tempdir().unwrap();
        let standardized_path = dir.path().join("standardized_locations.json");
        seed_store(&standardized_path);

        let provider = CannedProvider("I'd rather not.".to_string());
        let result = run_fallback(
            &provider,
            &standardized_path,
            &dir.path().join("fallback_locations.json"),
        )
        .await;
        assert!(matches!(result, Err(PipelineError::Ai(_))));
    }
}
