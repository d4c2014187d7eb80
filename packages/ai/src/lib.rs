#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! LLM-backed inference for the candidate pipeline.
//!
//! Two consumers sit on one provider abstraction:
//!
//! - [`fallback`] — bulk standardization of location strings the
//!   structured geocoder could not resolve. One request covers the
//!   whole failed set; the response must parse as a flat JSON mapping
//!   or the call is considered failed with no partial recovery.
//! - [`profile`] — per-candidate inference of the structured profile
//!   fields that cannot be lifted directly from the raw record.
//!
//! Providers implement [`providers::LlmProvider`]; any
//! `OpenAI`-compatible endpoint works via the base URL.

pub mod fallback;
pub mod profile;
pub mod providers;

use thiserror::Error;

/// Errors that can occur during LLM operations.
#[derive(Debug, Error)]
pub enum AiError {
    /// HTTP request to the LLM provider failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Provider-specific error (non-2xx response, empty completion).
    #[error("Provider error: {message}")]
    Provider {
        /// Description of what went wrong.
        message: String,
    },

    /// The completion text is not the well-formed output the caller
    /// demanded. The whole call is treated as failed.
    #[error("Response parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },
}
