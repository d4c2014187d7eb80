//! Canonical `"City, State/Province, Country"` assembly.
//!
//! Turns a structured lookup match into the standardized form the rest
//! of the pipeline keys on. Component priority:
//!
//! - city ← first of `city` | `town` | `village` | `suburb`
//! - region ← first of `state` | `province` | `county`
//! - country ← the provider's country field verbatim
//!
//! At least two components must be present; otherwise the provider
//! display name is used with postal codes stripped. Output is not
//! validated against any gazetteer — garbage in, garbage out.

use std::sync::LazyLock;

use regex::Regex;

use crate::PlaceMatch;

/// Regex for US-style postal codes (5-digit or ZIP+4) in display names.
static POSTAL_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{5}(?:-\d{4})?\b").expect("valid regex"));

/// Regex for the double commas left behind after stripping.
static DOUBLE_COMMA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*,").expect("valid regex"));

/// Builds the canonical string for a structured match, or `None` when
/// neither the components nor the display name yield anything usable.
#[must_use]
pub fn canonicalize(hit: &PlaceMatch) -> Option<String> {
    let mut parts: Vec<&str> = Vec::new();

    let address = &hit.address;
    let city = address
        .city
        .as_deref()
        .or(address.town.as_deref())
        .or(address.village.as_deref())
        .or(address.suburb.as_deref());
    if let Some(city) = city {
        parts.push(city);
    }

    let region = address
        .state
        .as_deref()
        .or(address.province.as_deref())
        .or(address.county.as_deref());
    if let Some(region) = region {
        parts.push(region);
    }

    if let Some(country) = address.country.as_deref() {
        parts.push(country);
    }

    if parts.len() >= 2 {
        // Drop exact duplicates (city-states report city == state),
        // keeping first occurrence.
        let mut deduped: Vec<&str> = Vec::with_capacity(parts.len());
        for part in parts {
            if !deduped.contains(&part) {
                deduped.push(part);
            }
        }
        return Some(deduped.join(", "));
    }

    clean_display_name(&hit.display_name)
}

/// Strips postal codes from a display name and tidies the commas left
/// behind. Returns `None` when nothing usable remains.
#[must_use]
pub fn clean_display_name(display_name: &str) -> Option<String> {
    if display_name.is_empty() {
        return None;
    }

    let cleaned = POSTAL_CODE_RE.replace_all(display_name, "");
    let cleaned = DOUBLE_COMMA_RE.replace_all(&cleaned, ",");
    let cleaned = cleaned.trim_matches([' ', ',']).to_string();

    if cleaned.is_empty() { None } else { Some(cleaned) }
}

#[cfg(test)]
mod tests {
    use crate::AddressDetails;

    use super::*;

    fn hit(address: AddressDetails, display_name: &str) -> PlaceMatch {
        PlaceMatch {
            display_name: display_name.to_string(),
            address,
            latitude: 0.0,
            longitude: 0.0,
            importance: 0.0,
        }
    }

    #[test]
    fn city_beats_town() {
        let h = hit(
            AddressDetails {
                city: Some("Frankfurt".to_string()),
                town: Some("Sachsenhausen".to_string()),
                state: Some("Hesse".to_string()),
                country: Some("Germany".to_string()),
                ..AddressDetails::default()
            },
            "",
        );
        assert_eq!(
            canonicalize(&h).as_deref(),
            Some("Frankfurt, Hesse, Germany")
        );
    }

    #[test]
    fn town_fills_in_when_city_absent() {
        let h = hit(
            AddressDetails {
                town: Some("Banff".to_string()),
                province: Some("Alberta".to_string()),
                country: Some("Canada".to_string()),
                ..AddressDetails::default()
            },
            "",
        );
        assert_eq!(canonicalize(&h).as_deref(), Some("Banff, Alberta, Canada"));
    }

    #[test]
    fn county_is_last_region_resort() {
        let h = hit(
            AddressDetails {
                village: Some("Grasmere".to_string()),
                county: Some("Cumbria".to_string()),
                country: Some("United Kingdom".to_string()),
                ..AddressDetails::default()
            },
            "",
        );
        assert_eq!(
            canonicalize(&h).as_deref(),
            Some("Grasmere, Cumbria, United Kingdom")
        );
    }

    #[test]
    fn city_state_duplicate_appears_once() {
        let h = hit(
            AddressDetails {
                city: Some("Singapore".to_string()),
                state: Some("Singapore".to_string()),
                country: Some("Singapore".to_string()),
                ..AddressDetails::default()
            },
            "",
        );
        assert_eq!(canonicalize(&h).as_deref(), Some("Singapore"));
    }

    #[test]
    fn single_component_falls_back_to_display_name() {
        let h = hit(
            AddressDetails {
                country: Some("France".to_string()),
                ..AddressDetails::default()
            },
            "Lyon, Auvergne-Rh\u{f4}ne-Alpes, 69002, France",
        );
        assert_eq!(
            canonicalize(&h).as_deref(),
            Some("Lyon, Auvergne-Rh\u{f4}ne-Alpes, France")
        );
    }

    #[test]
    fn fallback_strips_zip_plus_four() {
        assert_eq!(
            clean_display_name("Portland, Multnomah County, Oregon, 97201-1234, United States")
                .as_deref(),
            Some("Portland, Multnomah County, Oregon, United States")
        );
    }

    #[test]
    fn fallback_trims_leading_and_trailing_commas() {
        assert_eq!(clean_display_name("12345, Springfield").as_deref(), Some("Springfield"));
        assert_eq!(clean_display_name("Springfield, 12345").as_deref(), Some("Springfield"));
    }

    #[test]
    fn empty_everything_is_none() {
        let h = hit(AddressDetails::default(), "");
        assert_eq!(canonicalize(&h), None);
    }

    #[test]
    fn display_name_of_only_postal_codes_is_none() {
        assert_eq!(clean_display_name("12345, 67890"), None);
    }
}
