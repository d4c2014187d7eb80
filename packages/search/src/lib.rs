#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Proximity search, city grouping, and coordinate enrichment over a
//! candidate population.
//!
//! All three operations resolve each candidate's free-text location
//! through a [`GeocodeResolver`]; candidates whose location cannot be
//! resolved are carried without coordinates (grouping, enrichment) or
//! dropped (radius search), never treated as fatal.

pub mod haversine;
pub mod resolver;

use indexmap::IndexMap;
use serde::Serialize;
use talent_map_candidate_models::CandidateProfile;
use talent_map_location_models::{Coordinates, ResolvedLocation};

pub use haversine::haversine_miles;
pub use resolver::{GeocodeResolver, LocationLookup};

/// Bucket key for candidates whose city could not be determined.
pub const UNKNOWN_CITY: &str = "Unknown";

/// A candidate that fell inside the search radius.
#[derive(Debug, Clone, Serialize)]
pub struct ProximityMatch {
    /// The matched candidate.
    #[serde(flatten)]
    pub profile: CandidateProfile,
    /// Great-circle distance from the search center, rounded to two
    /// decimal places.
    pub distance_miles: f64,
    /// The candidate's resolved location.
    pub coordinates: ResolvedLocation,
}

/// A candidate annotated with whatever location data resolved.
#[derive(Debug, Clone, Serialize)]
pub struct LocatedCandidate {
    /// The candidate.
    #[serde(flatten)]
    pub profile: CandidateProfile,
    /// Resolved coordinate pair, absent when resolution failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    /// Resolved city component.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// Resolved state/province component.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Resolved country component.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// Finds every candidate within `radius_miles` of `center`, sorted by
/// distance ascending (equal distances keep input order).
///
/// An unresolvable center yields an empty result; unresolvable
/// candidates are skipped.
pub async fn find_within_radius<L: LocationLookup>(
    resolver: &mut GeocodeResolver<L>,
    candidates: &[CandidateProfile],
    center: &str,
    radius_miles: f64,
) -> Vec<ProximityMatch> {
    let Some(origin) = resolver.resolve(center).await else {
        log::error!("Could not resolve search center: {center}");
        return Vec::new();
    };

    let mut matches = Vec::new();
    for candidate in candidates {
        let Some(location) = candidate.location.as_deref() else {
            continue;
        };
        let Some(resolved) = resolver.resolve(location).await else {
            continue;
        };

        // Filter on the true distance; only the annotation is rounded.
        let miles = haversine_miles(origin.coordinates(), resolved.coordinates());
        if miles <= radius_miles {
            matches.push(ProximityMatch {
                profile: candidate.clone(),
                distance_miles: round2(miles),
                coordinates: resolved,
            });
        }
    }

    matches.sort_by(|a, b| a.distance_miles.total_cmp(&b.distance_miles));
    matches
}

/// Groups candidates by resolved city, in first-seen order.
///
/// Candidates with no location, or whose resolution failed, are left
/// out of the grouping entirely. The [`UNKNOWN_CITY`] bucket is only
/// for resolved locations the provider returned without a city
/// component.
pub async fn group_by_city<L: LocationLookup>(
    resolver: &mut GeocodeResolver<L>,
    candidates: &[CandidateProfile],
) -> IndexMap<String, Vec<LocatedCandidate>> {
    let mut groups: IndexMap<String, Vec<LocatedCandidate>> = IndexMap::new();

    for candidate in candidates {
        let Some(location) = candidate.location.as_deref() else {
            continue;
        };
        let Some(resolved) = resolver.resolve(location).await else {
            continue;
        };

        let city = if resolved.city.is_empty() {
            UNKNOWN_CITY.to_string()
        } else {
            resolved.city.clone()
        };
        groups.entry(city).or_default().push(LocatedCandidate {
            profile: candidate.clone(),
            coordinates: Some(resolved.coordinates()),
            city: Some(resolved.city),
            state: Some(resolved.state),
            country: Some(resolved.country),
        });
    }

    groups
}

/// Annotates every candidate with resolved coordinates and address
/// components, keeping unresolvable candidates unannotated.
pub async fn add_coordinates<L: LocationLookup>(
    resolver: &mut GeocodeResolver<L>,
    candidates: &[CandidateProfile],
) -> Vec<LocatedCandidate> {
    let mut annotated = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        annotated.push(annotate(resolver, candidate).await);
    }
    annotated
}

async fn annotate<L: LocationLookup>(
    resolver: &mut GeocodeResolver<L>,
    candidate: &CandidateProfile,
) -> LocatedCandidate {
    let resolved = match candidate.location.as_deref() {
        Some(location) => resolver.resolve(location).await,
        None => None,
    };

    resolved.map_or_else(
        || LocatedCandidate {
            profile: candidate.clone(),
            coordinates: None,
            city: None,
            state: None,
            country: None,
        },
        |hit| LocatedCandidate {
            profile: candidate.clone(),
            coordinates: Some(hit.coordinates()),
            city: Some(hit.city),
            state: Some(hit.state),
            country: Some(hit.country),
        },
    )
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
