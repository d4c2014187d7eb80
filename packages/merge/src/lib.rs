#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Reconciliation of fallback results into the primary store.
//!
//! The fallback pass produces its own `raw → outcome` map covering the
//! entries the primary pass marked `FAILED`. Merging replaces a failed
//! entry's *key* with the fallback's canonical string while keeping the
//! `FAILED` value, exactly as the historical pipeline did; downstream
//! files produced by earlier runs depend on this shape, so it is
//! preserved rather than "fixed" (the outcome counters keep the
//! upgraded entries auditable).
//!
//! Collisions never lose data: if the fallback maps a second raw string
//! onto a canonical key that already exists in the output being built,
//! the original raw key is kept with `FAILED`.

use indexmap::IndexMap;
use talent_map_location_models::Standardization;

/// Outcome counters from one merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeCounts {
    /// Failed entries whose key was upgraded to the fallback canonical.
    pub merged: usize,
    /// Kept as `FAILED` because the fallback answered `UNKNOWN`.
    pub kept_unknown: usize,
    /// Kept as `FAILED` because the fallback omitted the entry.
    pub kept_missing: usize,
    /// Kept as `FAILED` because the fallback also failed, or never
    /// attempted the entry.
    pub kept_failed: usize,
    /// Kept as `FAILED` because the fallback canonical collided with an
    /// existing key.
    pub kept_duplicate: usize,
}

/// Merges fallback results into the primary map.
///
/// Non-`FAILED` primary entries are copied unchanged; `FAILED` entries
/// are upgraded, kept, or collision-kept per the rules above. The
/// output preserves primary iteration order, with upgraded keys taking
/// the position of the entry they replaced.
#[must_use]
pub fn merge(
    primary: &IndexMap<String, Standardization>,
    fallback: &IndexMap<String, Standardization>,
) -> (IndexMap<String, Standardization>, MergeCounts) {
    let mut merged: IndexMap<String, Standardization> = IndexMap::with_capacity(primary.len());
    let mut counts = MergeCounts::default();

    for (raw, value) in primary {
        if !value.is_failed() {
            merged.insert(raw.clone(), value.clone());
            continue;
        }

        let Some(answer) = fallback.get(raw) else {
            log::debug!("Keeping FAILED (not attempted by fallback): {raw}");
            merged.insert(raw.clone(), Standardization::Failed);
            counts.kept_failed += 1;
            continue;
        };

        match answer {
            Standardization::Unknown => {
                log::debug!("Keeping FAILED (fallback: UNKNOWN): {raw}");
                merged.insert(raw.clone(), Standardization::Failed);
                counts.kept_unknown += 1;
            }
            Standardization::MissingFromResponse => {
                log::debug!("Keeping FAILED (missing from fallback response): {raw}");
                merged.insert(raw.clone(), Standardization::Failed);
                counts.kept_missing += 1;
            }
            Standardization::Failed => {
                log::debug!("Keeping FAILED (fallback also failed): {raw}");
                merged.insert(raw.clone(), Standardization::Failed);
                counts.kept_failed += 1;
            }
            Standardization::Canonical(canonical) => {
                if merged.contains_key(canonical) {
                    // Collision: keep the original raw key so no record
                    // is silently dropped.
                    log::warn!(
                        "Duplicate key from fallback: {raw} wanted {canonical}; keeping original"
                    );
                    merged.insert(raw.clone(), Standardization::Failed);
                    counts.kept_duplicate += 1;
                } else {
                    log::debug!("Replaced key: {raw} -> {canonical}");
                    merged.insert(canonical.clone(), Standardization::Failed);
                    counts.merged += 1;
                }
            }
        }
    }

    (merged, counts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canonical(s: &str) -> Standardization {
        Standardization::Canonical(s.to_string())
    }

    fn map(entries: &[(&str, Standardization)]) -> IndexMap<String, Standardization> {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn non_failed_entries_pass_through_unchanged() {
        let primary = map(&[
            ("Austin TX", canonical("Austin, Texas, United States")),
            ("gibberish", Standardization::Failed),
        ]);
        let fallback = map(&[("gibberish", Standardization::Unknown)]);

        let (merged, _) = merge(&primary, &fallback);

        assert_eq!(
            merged.get("Austin TX"),
            Some(&canonical("Austin, Texas, United States"))
        );
    }

    #[test]
    fn usable_fallback_upgrades_the_key_but_not_the_value() {
        let primary = map(&[("SF Bay Area", Standardization::Failed)]);
        let fallback = map(&[(
            "SF Bay Area",
            canonical("San Francisco, California, United States of America"),
        )]);

        let (merged, counts) = merge(&primary, &fallback);

        assert!(!merged.contains_key("SF Bay Area"));
        assert_eq!(
            merged.get("San Francisco, California, United States of America"),
            Some(&Standardization::Failed)
        );
        assert_eq!(counts.merged, 1);
    }

    #[test]
    fn unusable_fallback_outcomes_keep_the_original_entry() {
        let primary = map(&[
            ("a", Standardization::Failed),
            ("b", Standardization::Failed),
            ("c", Standardization::Failed),
            ("d", Standardization::Failed),
        ]);
        let fallback = map(&[
            ("a", Standardization::Unknown),
            ("b", Standardization::MissingFromResponse),
            ("c", Standardization::Failed),
            // "d" not attempted at all
        ]);

        let (merged, counts) = merge(&primary, &fallback);

        for key in ["a", "b", "c", "d"] {
            assert_eq!(merged.get(key), Some(&Standardization::Failed));
        }
        assert_eq!(counts.kept_unknown, 1);
        assert_eq!(counts.kept_missing, 1);
        assert_eq!(counts.kept_failed, 2);
    }

    #[test]
    fn collision_keeps_both_raw_keys_and_loses_nothing() {
        let primary = map(&[
            ("bay area", Standardization::Failed),
            ("the bay", Standardization::Failed),
        ]);
        let same = canonical("San Francisco, California, United States of America");
        let fallback = map(&[("bay area", same.clone()), ("the bay", same)]);

        let (merged, counts) = merge(&primary, &fallback);

        assert_eq!(merged.len(), 2);
        assert_eq!(
            merged.get("San Francisco, California, United States of America"),
            Some(&Standardization::Failed)
        );
        assert_eq!(merged.get("the bay"), Some(&Standardization::Failed));
        assert_eq!(counts.merged, 1);
        assert_eq!(counts.kept_duplicate, 1);
    }

    #[test]
    fn output_is_never_smaller_than_input() {
        let primary = map(&[
            ("x", canonical("Xi'an, Shaanxi, China")),
            ("y", Standardization::Failed),
            ("z", Standardization::Failed),
        ]);
        let fallback = map(&[
            ("y", canonical("Lima, Peru")),
            ("z", canonical("Lima, Peru")),
        ]);

        let (merged, _) = merge(&primary, &fallback);
        assert!(merged.len() >= primary.len());
    }
}
