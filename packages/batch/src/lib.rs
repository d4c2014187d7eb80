#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Resumable, rate-limited batch runner.
//!
//! Drives a per-item async step over a list of keys, persisting the
//! outcome into a [`MapStore`] after every single item. Keys already
//! present in the store are skipped on startup, so re-running against
//! the same output file resumes instead of reprocessing — an
//! at-least-once-safe resume, not a re-validation pass.
//!
//! Items are processed strictly in input order with one request in
//! flight at a time; the fixed sleep between items is the only pacing
//! mechanism (a policy constant for the provider's requests-per-second
//! ceiling, not adaptive backoff).

pub mod progress;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use talent_map_store::{MapStore, StoreError};

use crate::progress::ProgressCallback;

/// What the step produced for one item.
pub enum StepOutcome<V> {
    /// Usable result; persist it.
    Record(V),
    /// Terminal failure with a marker value to persist (e.g. `FAILED`).
    RecordFailure(V),
    /// Failure with nothing to persist; the key stays absent so a
    /// later run attempts it again.
    Skip,
}

/// Counts from one runner invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Items attempted this run (after resume filter and limit).
    pub processed: usize,
    /// Items that produced a usable result.
    pub succeeded: usize,
    /// Items that terminally failed (marker persisted).
    pub failed: usize,
    /// Items that failed without a persisted record.
    pub skipped: usize,
}

/// Runs `step` over every item not yet present in `store`, flushing the
/// full store after each item and sleeping `delay` between items.
///
/// `limit` caps how many items are attempted this run, applied AFTER
/// the resume filter so a limited run always makes forward progress.
///
/// A final flush is emitted after the loop even though every iteration
/// already wrote the file.
///
/// # Errors
///
/// Returns [`StoreError`] only if flushing the store fails; step
/// failures are recorded per-item and never abort the run.
pub async fn run_resumable<V, F, Fut>(
    items: Vec<String>,
    store: &mut MapStore<V>,
    delay: Duration,
    limit: Option<usize>,
    progress: &Arc<dyn ProgressCallback>,
    mut step: F,
) -> Result<RunSummary, StoreError>
where
    V: Serialize + DeserializeOwned,
    F: FnMut(String) -> Fut,
    Fut: Future<Output = StepOutcome<V>>,
{
    let total_input = items.len();
    let mut remaining: Vec<String> = items
        .into_iter()
        .filter(|item| !store.contains_key(item))
        .collect();

    let already_done = total_input - remaining.len();
    if already_done > 0 {
        log::info!(
            "Resuming: {already_done} of {total_input} items already in {}",
            store.path().display()
        );
    }

    if let Some(limit) = limit
        && limit < remaining.len()
    {
        log::info!("Limiting to {limit} of {} remaining items", remaining.len());
        remaining.truncate(limit);
    }

    if remaining.is_empty() {
        log::info!("All items already processed; nothing to do");
        return Ok(RunSummary::default());
    }

    progress.set_total(remaining.len() as u64);

    let mut summary = RunSummary::default();
    let count = remaining.len();

    for (i, item) in remaining.into_iter().enumerate() {
        progress.set_message(item.clone());
        log::debug!("Processing {}/{count}: {item}", i + 1);

        match step(item.clone()).await {
            StepOutcome::Record(value) => {
                store.insert(item, value);
                summary.succeeded += 1;
            }
            StepOutcome::RecordFailure(value) => {
                store.insert(item, value);
                summary.failed += 1;
            }
            StepOutcome::Skip => {
                summary.skipped += 1;
            }
        }
        summary.processed += 1;

        // Full rewrite after every item: a crash loses at most the
        // in-flight result, never a flushed one.
        store.flush()?;
        progress.inc(1);

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    store.flush()?;
    progress.finish(format!(
        "{} processed, {} ok, {} failed",
        summary.processed,
        summary.succeeded,
        summary.failed + summary.skipped
    ));

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use talent_map_location_models::Standardization;

    use super::progress::null_progress;
    use super::*;

    fn items(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[tokio::test]
    async fn records_outcomes_in_input_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let mut store: MapStore<Standardization> = MapStore::load(&path).unwrap();

        let summary = run_resumable(
            items(&["a", "b", "c"]),
            &mut store,
            Duration::ZERO,
            None,
            &null_progress(),
            |item| async move {
                if item == "b" {
                    StepOutcome::RecordFailure(Standardization::Failed)
                } else {
                    StepOutcome::Record(Standardization::Canonical(format!("{item} city")))
                }
            },
        )
        .await
        .unwrap();

        assert_eq!(summary.processed, 3);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);

        let keys: Vec<&String> = store.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["a", "b", "c"]);
        assert_eq!(store.get("b"), Some(&Standardization::Failed));
    }

    #[tokio::test]
    async fn second_run_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let mut store: MapStore<Standardization> = MapStore::load(&path).unwrap();

        let step = |item: String| async move {
            StepOutcome::Record(Standardization::Canonical(item))
        };

        let input = items(&["x", "y"]);
        run_resumable(
            input.clone(),
            &mut store,
            Duration::ZERO,
            None,
            &null_progress(),
            step,
        )
        .await
        .unwrap();

        // Reload from disk to prove resume works off the persisted file.
        let mut store: MapStore<Standardization> = MapStore::load(&path).unwrap();
        let summary = run_resumable(
            input,
            &mut store,
            Duration::ZERO,
            None,
            &null_progress(),
            step,
        )
        .await
        .unwrap();

        assert_eq!(summary, RunSummary::default());
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn interrupted_run_leaves_exactly_k_items_flushed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let mut store: MapStore<Standardization> = MapStore::load(&path).unwrap();

        // A limit of k models a crash after item k: the loop never
        // reaches the rest, and the file already holds k records.
        let summary = run_resumable(
            items(&["a", "b", "c", "d", "e"]),
            &mut store,
            Duration::ZERO,
            Some(3),
            &null_progress(),
            |item| async move {
                StepOutcome::Record(Standardization::Canonical(item))
            },
        )
        .await
        .unwrap();
        assert_eq!(summary.processed, 3);

        let on_disk: MapStore<Standardization> = MapStore::load(&path).unwrap();
        assert_eq!(on_disk.len(), 3);
        for (_, value) in &on_disk {
            assert!(matches!(value, Standardization::Canonical(_)));
        }

        // Resuming picks up the remaining two only.
        let mut store: MapStore<Standardization> = MapStore::load(&path).unwrap();
        let summary = run_resumable(
            items(&["a", "b", "c", "d", "e"]),
            &mut store,
            Duration::ZERO,
            None,
            &null_progress(),
            |item| async move {
                StepOutcome::Record(Standardization::Canonical(item))
            },
        )
        .await
        .unwrap();
        assert_eq!(summary.processed, 2);
        assert_eq!(store.len(), 5);
    }

    #[tokio::test]
    async fn limit_applies_after_resume_filter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let mut store: MapStore<Standardization> = MapStore::load(&path).unwrap();
        store.insert("a", Standardization::Failed);
        store.flush().unwrap();

        let summary = run_resumable(
            items(&["a", "b", "c"]),
            &mut store,
            Duration::ZERO,
            Some(1),
            &null_progress(),
            |item| async move {
                StepOutcome::Record(Standardization::Canonical(item))
            },
        )
        .await
        .unwrap();

        // "a" is skipped by resume, the limit of 1 lands on "b".
        assert_eq!(summary.processed, 1);
        assert!(store.contains_key("b"));
        assert!(!store.contains_key("c"));
    }

    #[tokio::test]
    async fn skip_leaves_key_absent_for_retry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let mut store: MapStore<Standardization> = MapStore::load(&path).unwrap();

        let summary = run_resumable(
            items(&["transient"]),
            &mut store,
            Duration::ZERO,
            None,
            &null_progress(),
            |_| async { StepOutcome::Skip },
        )
        .await
        .unwrap();

        assert_eq!(summary.skipped, 1);
        assert!(!store.contains_key("transient"));
    }
}
