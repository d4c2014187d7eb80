//! Bulk LLM fallback for locations the structured geocoder rejected.
//!
//! The geocoder fails on messy, ambiguous, or non-standard strings
//! ("SF Bay Area or remote", "EMEA", citizenship notes). A language
//! model handles these far better, so all failed strings go out in one
//! batch request asking for a strict JSON mapping back.
//!
//! The response must parse as exactly that mapping or the whole call is
//! failed — no partial recovery. Keys the model omitted are recorded as
//! [`Standardization::MissingFromResponse`], which is terminal and
//! distinct from the model answering `UNKNOWN`.

use indexmap::IndexMap;
use talent_map_location_models::Standardization;

use crate::AiError;
use crate::providers::LlmProvider;

const SYSTEM_PROMPT: &str =
    "You are a location standardization expert. Return only valid JSON.";

/// Builds the bulk standardization prompt for `locations`.
#[must_use]
pub fn build_prompt(locations: &[String]) -> String {
    let listing: String = locations
        .iter()
        .map(|loc| format!("- {loc}\n"))
        .collect();

    format!(
        r#"I have {count} location strings that failed to be standardized by geocoding APIs. Please standardize each location to the format "City, State/Province, Country".

Rules for standardization:
1. Convert to proper "City, State/Province, Country" format
2. Use full country names (not abbreviations: "USA" becomes "United States of America")
3. Use full state names (not abbreviations: "CA" becomes "California")
4. Remove extraneous information (citizenship notes, area descriptions, etc.)
5. For metropolitan areas, choose the primary city
6. For unclear locations, make your best guess based on context
7. If a location is genuinely impossible to determine, output "UNKNOWN"

Original locations to standardize:
{listing}
Please return a JSON object mapping each original location string to its standardized form. Return ONLY the JSON object, no other text."#,
        count = locations.len()
    )
}

/// Sends the whole failed set in one request and returns one outcome
/// per requested location, in request order.
///
/// # Errors
///
/// Returns [`AiError::Parse`] when the completion is not a flat JSON
/// string-to-string mapping, or any provider/transport error from the
/// underlying call. Either way the batch yields no results at all.
pub async fn standardize_batch(
    provider: &dyn LlmProvider,
    locations: &[String],
) -> Result<IndexMap<String, Standardization>, AiError> {
    log::info!(
        "Sending {} failed locations to the LLM fallback in one batch",
        locations.len()
    );

    let completion = provider
        .complete(SYSTEM_PROMPT, &build_prompt(locations))
        .await?;

    let mapping = parse_mapping(&completion)?;

    let mut results = IndexMap::with_capacity(locations.len());
    for location in locations {
        let outcome = mapping.get(location).map_or_else(
            || {
                log::warn!("Fallback response omitted: {location}");
                Standardization::MissingFromResponse
            },
            |answer| Standardization::from(answer.clone()),
        );
        results.insert(location.clone(), outcome);
    }

    Ok(results)
}

/// Parses the completion as a flat string-to-string JSON object,
/// tolerating a markdown code fence around it.
fn parse_mapping(completion: &str) -> Result<IndexMap<String, String>, AiError> {
    let stripped = strip_code_fence(completion.trim());
    serde_json::from_str(stripped).map_err(|e| AiError::Parse {
        message: format!("fallback completion is not a flat JSON mapping: {e}"),
    })
}

/// Removes a surrounding ``` or ```json fence, if present.
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.trim_start_matches(['\r', '\n']);
    rest.strip_suffix("```").map_or(rest, str::trim_end)
}
