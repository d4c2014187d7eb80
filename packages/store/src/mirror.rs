//! Human-readable text mirrors of the JSON stores.
//!
//! The mirrors exist purely for manual review; no component ever reads
//! them back. Format: a header, then one arrow-separated
//! `raw → canonical` line per entry in store order.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use talent_map_location_models::Standardization;

use crate::StoreError;

/// Writes the arrow-separated mirror of a standardization map.
///
/// # Errors
///
/// Returns [`StoreError::Io`] if the write fails.
pub fn write_standardization_mirror(
    path: &Path,
    entries: &IndexMap<String, Standardization>,
) -> Result<(), StoreError> {
    let mut out = String::new();
    out.push_str("Original Location → Standardized Location\n");
    out.push_str(&"=".repeat(50));
    out.push_str("\n\n");

    for (raw, outcome) in entries {
        out.push_str(raw);
        out.push_str(" → ");
        out.push_str(&outcome.to_string());
        out.push('\n');
    }

    fs::write(path, out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mirror_lists_entries_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("standardized_locations.txt");

        let mut entries = IndexMap::new();
        entries.insert(
            "Austin TX".to_string(),
            Standardization::Canonical("Austin, Texas, United States".to_string()),
        );
        entries.insert("Mars".to_string(), Standardization::Failed);

        write_standardization_mirror(&path, &entries).unwrap();
        let text = fs::read_to_string(&path).unwrap();

        assert!(text.starts_with("Original Location → Standardized Location\n"));
        let austin = text.find("Austin TX → Austin, Texas, United States").unwrap();
        let mars = text.find("Mars → FAILED").unwrap();
        assert!(austin < mars);
    }
}
