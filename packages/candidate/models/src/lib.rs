#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Raw candidate record and structured profile types.
//!
//! Raw candidates arrive as loosely shaped JSON exported from the ATS;
//! only the handful of fields the pipeline reads are modeled, everything
//! else passes through untouched via `extra`. The structured
//! [`CandidateProfile`] is the output schema of the profile transform:
//! directly lifted fields plus LLM-inferred ones.

use serde::{Deserialize, Serialize};

/// A raw candidate record as exported from the ATS.
///
/// Unmodeled fields are preserved in `extra` so re-serialization does
/// not lose data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCandidate {
    /// ATS candidate identifier.
    #[serde(default)]
    pub id: Option<String>,
    /// Candidate display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Free-text location field; the input to the standardization
    /// pipeline. May be empty or a non-location placeholder.
    #[serde(default)]
    pub location: Option<String>,
    /// Confidentiality flag from the ATS.
    #[serde(default)]
    pub confidentiality: Option<String>,
    /// ATS tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Parsed resume payload, if the ATS attached one.
    #[serde(default)]
    pub parsed_resume: Option<ParsedResume>,
    /// Everything else in the record, passed through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Parsed resume payload attached to a raw candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ParsedResume {
    /// Work history positions, most recent first.
    #[serde(default)]
    pub positions: Vec<Position>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One position from a parsed resume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Position {
    /// Organization name.
    #[serde(default)]
    pub org: String,
    /// Job title.
    #[serde(default)]
    pub title: String,
    /// Free-text summary of the role.
    #[serde(default)]
    pub summary: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A structured candidate profile: direct ATS fields plus LLM-inferred
/// ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    /// ATS candidate identifier.
    pub id: Option<String>,
    /// Candidate display name.
    pub name: Option<String>,
    /// Free-text location (unstandardized; see the location pipeline).
    pub location: Option<String>,
    /// Confidentiality flag.
    pub confidentiality: String,
    /// ATS tags.
    pub tags: Vec<String>,
    /// Work history lifted from the parsed resume.
    pub job_vectors: Vec<JobVector>,
    /// Current job title (inferred, most recent position).
    pub current_title: String,
    /// Current organization (inferred, most recent position).
    pub current_org: String,
    /// Seniority level (e.g. "Senior", "Staff", "Principal").
    pub seniority: String,
    /// Skills, including programming languages inferred from
    /// experience descriptions.
    pub skills: Vec<String>,
    /// Total years of experience calculated from work history.
    pub years_experience: i64,
    /// Whether the candidate has startup experience.
    pub worked_at_startup: bool,
    /// Education entries.
    pub education: Vec<Education>,
}

/// One work-history entry on a structured profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct JobVector {
    /// Embedding vector identifier, assigned downstream (empty here).
    pub vector_id: String,
    /// Organization name.
    pub org: String,
    /// Job title.
    pub title: String,
    /// Free-text role summary.
    pub summary: String,
}

/// One education entry on a structured profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Education {
    /// Institution name only (e.g. "Stanford", not the department).
    pub school: String,
    /// Degree level only (e.g. "Bachelor of Engineering").
    pub degree: String,
    /// Field of study (e.g. "Computer Engineering").
    pub field: String,
}

/// The LLM-inferred slice of a profile, parsed from the model response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferredProfile {
    /// Current job title from the most recent position.
    pub current_title: String,
    /// Current organization from the most recent position.
    pub current_org: String,
    /// Seniority level.
    pub seniority: String,
    /// Skills including programming languages.
    pub skills: Vec<String>,
    /// Total years of experience.
    pub years_experience: i64,
    /// Whether the candidate worked at startups.
    pub worked_at_startup: bool,
    /// Cleaned education entries.
    pub education: Vec<Education>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_candidate_preserves_unknown_fields() {
        let json = r#"{
            "id": "cand-1",
            "name": "A. Person",
            "location": "SF Bay Area",
            "stage": "lead",
            "parsed_resume": {"positions": [{"org": "Acme", "title": "Engineer", "summary": ""}]}
        }"#;
        let candidate: RawCandidate = serde_json::from_str(json).unwrap();
        assert_eq!(candidate.location.as_deref(), Some("SF Bay Area"));
        assert_eq!(candidate.parsed_resume.as_ref().unwrap().positions.len(), 1);
        assert_eq!(candidate.extra["stage"], "lead");

        let back = serde_json::to_value(&candidate).unwrap();
        assert_eq!(back["stage"], "lead");
    }

    #[test]
    fn missing_location_deserializes_as_none() {
        let candidate: RawCandidate = serde_json::from_str(r#"{"id": "cand-2"}"#).unwrap();
        assert!(candidate.location.is_none());
        assert!(candidate.tags.is_empty());
    }
}
