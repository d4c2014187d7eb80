#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Location extraction from raw candidate batch exports.
//!
//! The ATS export directory holds `batch_NNN_with_parsed.json` files,
//! each an array of raw candidate records (occasionally a single
//! record). This crate scans them, pulls every usable free-text
//! location, and produces the deduplicated seed list the
//! standardization pipeline consumes, together with frequency counts
//! for auditing.
//!
//! A file that is missing or does not parse is logged and skipped; one
//! corrupt batch never aborts the whole extraction.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use talent_map_candidate_models::RawCandidate;
use thiserror::Error;

/// Placeholder strings the ATS writes when a candidate has no real
/// location.
const PLACEHOLDERS: [&str; 4] = ["N/A", "n/a", "NA", "null"];

static BATCH_FILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^batch_(\d+)_with_parsed\.json$").unwrap());

/// Errors from the extraction pass.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Filesystem read or write failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Artifact serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Summary metadata embedded in the extraction artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionMetadata {
    /// Locations found across all batch files, duplicates included.
    pub total_locations_extracted: usize,
    /// Distinct location strings.
    pub unique_locations: usize,
    /// Batch files read (corrupt files excluded).
    pub batch_files_processed: usize,
    /// Numeric range of the batch files found, e.g. `"001-121"`.
    pub batch_range: String,
}

/// The extraction artifact persisted as `batch_locations.json`.
///
/// `locations` preserves first-seen order; `location_frequency` is
/// ordered by descending count (ties keep first-seen order).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedLocations {
    /// Summary counters for the run.
    pub metadata: ExtractionMetadata,
    /// Distinct location strings, first-seen order.
    pub locations: Vec<String>,
    /// Occurrence count per distinct location.
    pub location_frequency: IndexMap<String, usize>,
}

/// Finds all `batch_NNN_with_parsed.json` files in `dir`, ordered by
/// batch number.
///
/// # Errors
///
/// Returns [`ExtractError::Io`] if the directory cannot be read.
pub fn scan_batch_files(dir: &Path) -> Result<Vec<PathBuf>, ExtractError> {
    let mut found: Vec<(u32, PathBuf)> = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if let Some(captures) = BATCH_FILE_RE.captures(name)
            && let Ok(number) = captures[1].parse::<u32>()
        {
            found.push((number, entry.path()));
        }
    }

    found.sort_by_key(|(number, _)| *number);
    Ok(found.into_iter().map(|(_, path)| path).collect())
}

/// Pulls every usable location string from one batch file.
///
/// The file is normally an array of candidates; a single candidate
/// object is tolerated. Empty and placeholder locations are dropped.
///
/// # Errors
///
/// Returns [`ExtractError`] when the file cannot be read or parsed.
pub fn extract_file_locations(path: &Path) -> Result<Vec<String>, ExtractError> {
    let contents = fs::read_to_string(path)?;

    let candidates: Vec<RawCandidate> = match serde_json::from_str(&contents) {
        Ok(batch) => batch,
        Err(_) => vec![serde_json::from_str::<RawCandidate>(&contents)?],
    };

    Ok(candidates
        .iter()
        .filter_map(|candidate| candidate.location.as_deref())
        .map(str::trim)
        .filter(|location| !location.is_empty() && !PLACEHOLDERS.contains(location))
        .map(ToString::to_string)
        .collect())
}

/// Extracts and deduplicates locations from every batch file in `dir`.
///
/// Corrupt or unreadable batch files are logged and skipped.
///
/// # Errors
///
/// Returns [`ExtractError::Io`] if the directory itself cannot be read.
pub fn extract_all(dir: &Path) -> Result<ExtractedLocations, ExtractError> {
    let files = scan_batch_files(dir)?;
    log::info!("Found {} batch files in {}", files.len(), dir.display());

    let mut total = 0;
    let mut processed = 0;
    let mut numbers: Vec<u32> = Vec::new();
    let mut frequency: IndexMap<String, usize> = IndexMap::new();

    for path in &files {
        let locations = match extract_file_locations(path) {
            Ok(locations) => locations,
            Err(e) => {
                log::warn!("Skipping {}: {e}", path.display());
                continue;
            }
        };
        log::debug!("Found {} locations in {}", locations.len(), path.display());

        processed += 1;
        if let Some(name) = path.file_name().and_then(|n| n.to_str())
            && let Some(captures) = BATCH_FILE_RE.captures(name)
            && let Ok(number) = captures[1].parse::<u32>()
        {
            numbers.push(number);
        }

        total += locations.len();
        for location in locations {
            *frequency.entry(location).or_insert(0) += 1;
        }
    }

    let locations: Vec<String> = frequency.keys().cloned().collect();

    let batch_range = match (numbers.first(), numbers.last()) {
        (Some(first), Some(last)) => format!("{first:03}-{last:03}"),
        _ => String::new(),
    };

    // Frequency is reported most-common-first; the location list keeps
    // first-seen order for the standardization pass.
    frequency.sort_by(|_, a, _, b| b.cmp(a));

    Ok(ExtractedLocations {
        metadata: ExtractionMetadata {
            total_locations_extracted: total,
            unique_locations: locations.len(),
            batch_files_processed: processed,
            batch_range,
        },
        locations,
        location_frequency: frequency,
    })
}

/// Writes the JSON artifact and the one-location-per-line text listing.
///
/// # Errors
///
/// Returns [`ExtractError`] on serialization or write failure.
pub fn write_artifacts(
    extracted: &ExtractedLocations,
    json_path: &Path,
    text_path: &Path,
) -> Result<(), ExtractError> {
    let json = serde_json::to_string_pretty(extracted)?;
    fs::write(json_path, json)?;

    let mut text = fs::File::create(text_path)?;
    for location in &extracted.locations {
        writeln!(text, "{location}")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_batch(dir: &Path, name: &str, body: &str) {
        fs::write(dir.join(name), body).unwrap();
    }

    #[test]
    fn scan_orders_by_batch_number_and_ignores_other_files() {
        let dir = tempfile::tempdir().unwrap();
        write_batch(dir.path(), "batch_010_with_parsed.json", "[]");
        write_batch(dir.path(), "batch_002_with_parsed.json", "[]");
        write_batch(dir.path(), "notes.txt", "");
        write_batch(dir.path(), "batch_002.json", "[]");

        let files = scan_batch_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(
            names,
            vec!["batch_002_with_parsed.json", "batch_010_with_parsed.json"]
        );
    }

    #[test]
    fn placeholders_and_blanks_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        write_batch(
            dir.path(),
            "batch_001_with_parsed.json",
            r#"[
                {"location": "Austin, TX"},
                {"location": "  "},
                {"location": "N/A"},
                {"location": "null"},
                {"location": " Berlin "},
                {"name": "no location at all"}
            ]"#,
        );

        let locations =
            extract_file_locations(&dir.path().join("batch_001_with_parsed.json")).unwrap();
        assert_eq!(locations, vec!["Austin, TX", "Berlin"]);
    }

    #[test]
    fn single_candidate_object_is_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        write_batch(
            dir.path(),
            "batch_001_with_parsed.json",
            r#"{"location": "Oslo"}"#,
        );

        let locations =
            extract_file_locations(&dir.path().join("batch_001_with_parsed.json")).unwrap();
        assert_eq!(locations, vec!["Oslo"]);
    }

    #[test]
    fn extraction_dedupes_counts_and_skips_corrupt_files() {
        let dir = tempfile::tempdir().unwrap();
        write_batch(
            dir.path(),
            "batch_001_with_parsed.json",
            r#"[{"location": "Austin, TX"}, {"location": "Berlin"}]"#,
        );
        write_batch(
            dir.path(),
            "batch_002_with_parsed.json",
            r#"[{"location": "Berlin"}, {"location": "Berlin"}]"#,
        );
        write_batch(dir.path(), "batch_003_with_parsed.json", "{not json");

        let extracted = extract_all(dir.path()).unwrap();

        assert_eq!(extracted.metadata.total_locations_extracted, 4);
        assert_eq!(extracted.metadata.unique_locations, 2);
        assert_eq!(extracted.metadata.batch_files_processed, 2);
        assert_eq!(extracted.metadata.batch_range, "001-002");

        // First-seen order for the seed list.
        assert_eq!(extracted.locations, vec!["Austin, TX", "Berlin"]);

        // Most common first in the frequency report.
        let ordered: Vec<_> = extracted.location_frequency.keys().cloned().collect();
        assert_eq!(ordered, vec!["Berlin", "Austin, TX"]);
        assert_eq!(extracted.location_frequency["Berlin"], 3);
    }

    #[test]
    fn artifacts_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        write_batch(
            dir.path(),
            "batch_001_with_parsed.json",
            r#"[{"location": "Austin, TX"}, {"location": "Berlin"}]"#,
        );

        let extracted = extract_all(dir.path()).unwrap();
        let json_path = dir.path().join("batch_locations.json");
        let text_path = dir.path().join("batch_locations.txt");
        write_artifacts(&extracted, &json_path, &text_path).unwrap();

        let back: ExtractedLocations =
            serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(back, extracted);

        let text = fs::read_to_string(&text_path).unwrap();
        assert_eq!(text, "Austin, TX\nBerlin\n");
    }
}
