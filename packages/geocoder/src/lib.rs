#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Structured geocoding lookup and canonical location assembly.
//!
//! The lookup client speaks the `LocationIQ`-style search API (a
//! Nominatim-compatible endpoint): free-text query, `limit=1`, optional
//! address component breakdown. [`canonical`] turns a structured match
//! into the pipeline's `"City, State/Province, Country"` form.
//!
//! The public `LocationIQ` tier allows 2 requests per second; pacing is
//! the batch runner's job, not the client's.

pub mod canonical;
pub mod locationiq;

use thiserror::Error;

/// Errors from lookup operations.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimited,
}

/// A single structured match from the lookup provider.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceMatch {
    /// Full provider display name (comma-separated place hierarchy).
    pub display_name: String,
    /// Address component breakdown.
    pub address: AddressDetails,
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
    /// Provider importance/confidence score.
    pub importance: f64,
}

/// Address component breakdown as returned by the provider.
///
/// Providers populate different subsets of these depending on place
/// type; the canonicalizer applies a priority order over them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AddressDetails {
    /// City name.
    pub city: Option<String>,
    /// Town name (smaller settlements).
    pub town: Option<String>,
    /// Village name.
    pub village: Option<String>,
    /// Suburb name.
    pub suburb: Option<String>,
    /// State name.
    pub state: Option<String>,
    /// Province name.
    pub province: Option<String>,
    /// County name.
    pub county: Option<String>,
    /// Full country name.
    pub country: Option<String>,
    /// ISO country code.
    pub country_code: Option<String>,
}

/// A coordinates-only match (`addressdetails=0`) for the geocode pass.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateMatch {
    /// Latitude (WGS84).
    pub lat: f64,
    /// Longitude (WGS84).
    pub lng: f64,
    /// Provider display name; falls back to the query string when the
    /// provider omits it.
    pub display_name: String,
    /// Provider importance/confidence score (0 when absent).
    pub importance: f64,
}
