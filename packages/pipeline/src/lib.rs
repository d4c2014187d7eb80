#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Stage drivers for the location standardization pipeline.
//!
//! Each driver wires one stage end to end: load the relevant stores,
//! drive the work (batch runner, LLM call, or pure merge), and rewrite
//! the persisted artifacts. The lookup and LLM clients are passed in so
//! every stage can run against canned implementations.
//!
//! Stage order: standardize → retry → fallback → merge → geocode.

pub mod fallback;
pub mod geocode;
pub mod merge;
pub mod retry;
pub mod standardize;

use std::time::Duration;

use async_trait::async_trait;
use talent_map_ai::AiError;
use talent_map_extract::ExtractError;
use talent_map_geocoder::locationiq::LookupClient;
use talent_map_geocoder::{CoordinateMatch, GeocodeError, PlaceMatch};
use talent_map_store::StoreError;
use thiserror::Error;

/// Delay between lookup requests. The provider's public tier allows
/// 2 requests per second.
pub const LOOKUP_DELAY: Duration = Duration::from_millis(500);

/// Errors from pipeline stage drivers.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A persisted store could not be read or written.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The LLM fallback or profile call failed.
    #[error(transparent)]
    Ai(#[from] AiError),

    /// The extraction pass failed.
    #[error(transparent)]
    Extract(#[from] ExtractError),

    /// CSV export failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Filesystem read or write failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The two lookup shapes the pipeline needs from the geocoding
/// provider.
///
/// [`LookupClient`] is the production implementation; stage tests
/// substitute canned tables.
#[async_trait]
pub trait LocationApi: Send + Sync {
    /// Structured lookup with address components, for standardization.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] on transport or parse failure.
    async fn place(&self, query: &str) -> Result<Option<PlaceMatch>, GeocodeError>;

    /// Coordinates-only lookup, for the geocode pass.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] on transport or parse failure.
    async fn coordinates(&self, query: &str) -> Result<Option<CoordinateMatch>, GeocodeError>;
}

#[async_trait]
impl LocationApi for LookupClient {
    async fn place(&self, query: &str) -> Result<Option<PlaceMatch>, GeocodeError> {
        self.search_structured(query).await
    }

    async fn coordinates(&self, query: &str) -> Result<Option<CoordinateMatch>, GeocodeError> {
        self.search_coordinates(query).await
    }
}
