//! Location pipeline stages, wired to the `data/` directory.

use std::error::Error;
use std::path::PathBuf;

use dialoguer::{Confirm, Input};
use talent_map_cli_utils::{IndicatifProgress, MultiProgress};
use talent_map_pipeline::{LOOKUP_DELAY, fallback, geocode, merge, retry, standardize};
use talent_map_store::paths;

use crate::{llm_provider, lookup_client, prompt_optional_limit};

/// Scans the batch export directory and writes the seed location list.
pub fn extract() -> Result<(), Box<dyn Error>> {
    let default_dir = paths::data_dir().join("batches");
    let dir: String = Input::new()
        .with_prompt("Batch files directory")
        .default(default_dir.display().to_string())
        .interact_text()?;

    let extracted = talent_map_extract::extract_all(&PathBuf::from(dir))?;

    let json_path = paths::batch_locations_path();
    talent_map_extract::write_artifacts(
        &extracted,
        &json_path,
        &paths::text_mirror_path(&json_path),
    )?;

    println!(
        "Extracted {} locations ({} unique) from {} batch files",
        extracted.metadata.total_locations_extracted,
        extracted.metadata.unique_locations,
        extracted.metadata.batch_files_processed
    );
    println!("Saved to {}", json_path.display());
    Ok(())
}

/// Runs the primary standardization pass over the seed list.
pub async fn standardize(multi: &MultiProgress) -> Result<(), Box<dyn Error>> {
    let client = lookup_client()?;
    let seeds = standardize::load_seed_locations(&paths::batch_locations_path())?;
    let limit = prompt_optional_limit("Number of locations to process (empty for all)")?;

    let progress = IndicatifProgress::batch_bar(multi, "Standardizing locations");
    let summary = standardize::run_standardize(
        &client,
        seeds,
        &paths::standardized_locations_path(),
        LOOKUP_DELAY,
        limit,
        &progress,
    )
    .await?;

    println!(
        "{} processed: {} standardized, {} failed",
        summary.processed, summary.succeeded, summary.failed
    );
    Ok(())
}

/// Retries everything currently marked `FAILED`.
pub async fn retry_failed(multi: &MultiProgress) -> Result<(), Box<dyn Error>> {
    let client = lookup_client()?;
    let limit = prompt_optional_limit("Number of retries (empty for all)")?;

    let progress = IndicatifProgress::batch_bar(multi, "Retrying failed locations");
    let summary = retry::run_retry(
        &client,
        &paths::standardized_locations_path(),
        LOOKUP_DELAY,
        limit,
        &progress,
    )
    .await?;

    println!(
        "{} attempted: {} recovered, {} still failed",
        summary.attempted, summary.recovered, summary.still_failed
    );
    Ok(())
}

/// Sends the remaining failures through the LLM fallback.
pub async fn fallback() -> Result<(), Box<dyn Error>> {
    let provider = llm_provider()?;

    let summary = fallback::run_fallback(
        &provider,
        &paths::standardized_locations_path(),
        &paths::fallback_locations_path(),
    )
    .await?;

    println!(
        "{} sent: {} standardized, {} unknown, {} missing from response",
        summary.attempted, summary.standardized, summary.unknown, summary.missing
    );
    println!(
        "Review {} before merging",
        paths::text_mirror_path(&paths::fallback_locations_path()).display()
    );
    Ok(())
}

/// Merges reviewed fallback results into the primary store.
pub fn merge_fallback() -> Result<(), Box<dyn Error>> {
    let confirmed = Confirm::new()
        .with_prompt("Merge fallback results into the standardization store?")
        .default(false)
        .interact()?;
    if !confirmed {
        println!("Merge cancelled.");
        return Ok(());
    }

    let counts = merge::run_merge(
        &paths::standardized_locations_path(),
        &paths::fallback_locations_path(),
        &paths::standardized_backup_path(),
    )?;

    println!(
        "{} keys upgraded; kept as FAILED: {} unknown, {} missing, {} failed, {} duplicates",
        counts.merged,
        counts.kept_unknown,
        counts.kept_missing,
        counts.kept_failed,
        counts.kept_duplicate
    );
    println!(
        "Backup written to {}",
        paths::standardized_backup_path().display()
    );
    Ok(())
}

/// Geocodes every canonical location and rewrites the exports.
pub async fn geocode(multi: &MultiProgress) -> Result<(), Box<dyn Error>> {
    let client = lookup_client()?;
    let limit = prompt_optional_limit("Number of locations to geocode (empty for all)")?;

    let progress = IndicatifProgress::batch_bar(multi, "Geocoding locations");
    let summary = geocode::run_geocode(
        &client,
        &paths::standardized_locations_path(),
        &paths::geocoded_locations_path(),
        &paths::geocoded_csv_path(),
        &paths::geocoded_reverse_path(),
        LOOKUP_DELAY,
        limit,
        &progress,
    )
    .await?;

    println!(
        "{} attempted: {} geocoded, {} failed",
        summary.processed, summary.succeeded, summary.skipped
    );
    Ok(())
}
