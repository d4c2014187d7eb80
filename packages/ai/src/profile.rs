//! Structured profile extraction from raw candidate records.
//!
//! Fields that exist verbatim in the raw record (id, name, location,
//! tags, work history) are lifted in code; only the fields that need
//! judgment (seniority, skills, years of experience, cleaned education)
//! go through the model. The completion must parse as the inferred
//! slice of the profile schema.

use talent_map_candidate_models::{CandidateProfile, InferredProfile, JobVector, RawCandidate};

use crate::AiError;
use crate::providers::LlmProvider;

const SYSTEM_PROMPT: &str =
    "Extract the structured profile information from candidate data. Return only valid JSON.";

/// Builds the inference prompt for one raw candidate.
fn build_prompt(raw: &RawCandidate) -> Result<String, AiError> {
    let raw_json = serde_json::to_string_pretty(raw)?;
    Ok(format!(
        r#"Based on the following candidate data, extract and infer the remaining profile information.

Raw candidate data:
{raw_json}

Please extract and return a JSON object with:
- current_title: Current job title from most recent position
- current_org: Current organization from most recent position
- seniority: Seniority level (e.g., Entry, Junior, Mid, Senior, Staff, Principal, Executive) based on titles and experience
- skills: List of all skills including programming languages inferred from experience descriptions
- years_experience: Total years of experience calculated from work history
- worked_at_startup: Boolean indicating if they worked at startups
- education: List of education objects with properly cleaned:
  * school: Just the university/institution name (e.g., "Stanford" not "Stanford University Department of Computer Science")
  * degree: Just the degree level (e.g., "Bachelor of Engineering" not "Bachelor of Engineering, Computer Engineering")
  * field: The field of study (e.g., "Computer Engineering" extracted from degree or field data)

Return ONLY the JSON object, no other text."#
    ))
}

/// Transforms one raw candidate into a structured profile.
///
/// # Errors
///
/// Returns [`AiError`] if the provider call fails or the completion
/// does not parse as the inferred profile schema. Callers processing a
/// file of candidates log and skip the failed record.
pub async fn extract_profile(
    provider: &dyn LlmProvider,
    raw: &RawCandidate,
) -> Result<CandidateProfile, AiError> {
    let completion = provider.complete(SYSTEM_PROMPT, &build_prompt(raw)?).await?;

    let stripped = strip_fence(completion.trim());
    let inferred: InferredProfile = serde_json::from_str(stripped).map_err(|e| AiError::Parse {
        message: format!("profile completion is not the inferred schema: {e}"),
    })?;

    let job_vectors = raw
        .parsed_resume
        .as_ref()
        .map(|resume| {
            resume
                .positions
                .iter()
                .map(|p| JobVector {
                    vector_id: String::new(),
                    org: p.org.clone(),
                    title: p.title.clone(),
                    summary: p.summary.clone(),
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(CandidateProfile {
        id: raw.id.clone(),
        name: raw.name.clone(),
        location: raw.location.clone(),
        confidentiality: raw
            .confidentiality
            .clone()
            .unwrap_or_else(|| "non-confidential".to_string()),
        tags: raw.tags.clone(),
        job_vectors,
        current_title: inferred.current_title,
        current_org: inferred.current_org,
        seniority: inferred.seniority,
        skills: inferred.skills,
        years_experience: inferred.years_experience,
        worked_at_startup: inferred.worked_at_startup,
        education: inferred.education,
    })
}

fn strip_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.trim_start_matches(['\r', '\n']);
    rest.strip_suffix("```").map_or(rest, str::trim_end)
}
