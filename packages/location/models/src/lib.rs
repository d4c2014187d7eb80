#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Location standardization and geocoding result types.
//!
//! The standardization pipeline persists its state as JSON maps whose
//! values are either a canonical `"City, State/Province, Country"` string
//! or one of the legacy sentinel strings (`"FAILED"`, `"UNKNOWN"`,
//! `"MISSING_FROM_RESPONSE"`). In code those sentinels are a tagged
//! [`Standardization`] enum; serde converts to and from the sentinel
//! strings so existing store files round-trip unchanged.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Sentinel stored when a standardization attempt exhausted with no
/// usable result.
pub const FAILED: &str = "FAILED";

/// Sentinel stored when the fallback pass explicitly could not determine
/// a location.
pub const UNKNOWN: &str = "UNKNOWN";

/// Sentinel stored when the fallback response omitted a requested raw
/// string entirely. Distinct from [`UNKNOWN`]: the fallback never judged
/// this entry.
pub const MISSING_FROM_RESPONSE: &str = "MISSING_FROM_RESPONSE";

/// Outcome of a standardization attempt for one raw location string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Standardization {
    /// A canonical `"City, State/Province, Country"` string.
    Canonical(String),
    /// The attempt exhausted with no usable result.
    Failed,
    /// The fallback pass judged the location indeterminate.
    Unknown,
    /// The fallback response omitted this entry.
    MissingFromResponse,
}

impl Standardization {
    /// Returns `true` for the [`Standardization::Failed`] variant.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }

    /// Returns the canonical string, if this outcome carries one.
    #[must_use]
    pub fn as_canonical(&self) -> Option<&str> {
        match self {
            Self::Canonical(s) => Some(s),
            _ => None,
        }
    }

    /// Returns `true` if the fallback could not improve on a failure
    /// (any variant other than [`Standardization::Canonical`]).
    #[must_use]
    pub const fn is_unusable(&self) -> bool {
        !matches!(self, Self::Canonical(_))
    }
}

impl From<String> for Standardization {
    fn from(value: String) -> Self {
        match value.as_str() {
            FAILED => Self::Failed,
            UNKNOWN => Self::Unknown,
            MISSING_FROM_RESPONSE => Self::MissingFromResponse,
            _ => Self::Canonical(value),
        }
    }
}

impl From<Standardization> for String {
    fn from(value: Standardization) -> Self {
        match value {
            Standardization::Canonical(s) => s,
            Standardization::Failed => FAILED.to_string(),
            Standardization::Unknown => UNKNOWN.to_string(),
            Standardization::MissingFromResponse => MISSING_FROM_RESPONSE.to_string(),
        }
    }
}

impl fmt::Display for Standardization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Canonical(s) => f.write_str(s),
            Self::Failed => f.write_str(FAILED),
            Self::Unknown => f.write_str(UNKNOWN),
            Self::MissingFromResponse => f.write_str(MISSING_FROM_RESPONSE),
        }
    }
}

/// A geocoded canonical location as persisted in
/// `geocoded_locations.json`, keyed by the canonical string.
///
/// Created once per unique canonical location; re-running the geocoder
/// skips keys already present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodedLocation {
    /// Latitude (WGS84).
    pub lat: f64,
    /// Longitude (WGS84).
    pub lng: f64,
    /// Provider display name for the matched place.
    pub display_name: String,
    /// Provider importance/confidence score.
    pub importance: f64,
    /// Every raw free-text variant that standardized to this location.
    pub original_locations: Vec<String>,
    /// Count of `original_locations`.
    pub original_count: usize,
}

/// One row of the regenerated reverse index
/// (`geocoded_locations_reverse.json`): raw string → coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReverseMapping {
    /// The canonical location the raw string standardized to.
    pub standardized_location: String,
    /// Latitude (WGS84).
    pub lat: f64,
    /// Longitude (WGS84).
    pub lng: f64,
    /// Provider display name.
    pub display_name: String,
}

/// A coordinate pair used by the proximity search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude (WGS84).
    pub lat: f64,
    /// Longitude (WGS84).
    pub lon: f64,
}

/// A fully resolved location as returned by the structured lookup,
/// attached to candidates during search and enrichment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    /// Latitude (WGS84).
    pub lat: f64,
    /// Longitude (WGS84).
    pub lon: f64,
    /// Provider display name for the matched place.
    pub formatted_address: String,
    /// City component ("" when the provider returned none).
    pub city: String,
    /// State/province component ("" when absent).
    pub state: String,
    /// Country component ("" when absent).
    pub country: String,
}

impl ResolvedLocation {
    /// The coordinate pair for distance math.
    #[must_use]
    pub const fn coordinates(&self) -> Coordinates {
        Coordinates {
            lat: self.lat,
            lon: self.lon,
        }
    }
}
