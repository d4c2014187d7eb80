//! Candidate-facing tools: proximity search, city grouping, and
//! profile transformation.

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use dialoguer::Input;
use talent_map_candidate_models::{CandidateProfile, RawCandidate};
use talent_map_pipeline::LOOKUP_DELAY;
use talent_map_search::{GeocodeResolver, find_within_radius, group_by_city as group_candidates};
use talent_map_store::paths;

use crate::{llm_provider, lookup_client, prompt_optional_limit};

fn prompt_profiles_path() -> Result<PathBuf, Box<dyn Error>> {
    let path: String = Input::new()
        .with_prompt("Candidate profiles file")
        .default(paths::candidate_profiles_path().display().to_string())
        .interact_text()?;
    Ok(PathBuf::from(path))
}

fn load_profiles(path: &Path) -> Result<Vec<CandidateProfile>, Box<dyn Error>> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Finds every candidate within a radius of a free-text center.
pub async fn radius_search() -> Result<(), Box<dyn Error>> {
    let profiles = load_profiles(&prompt_profiles_path()?)?;

    let center: String = Input::new()
        .with_prompt("Center location (e.g. \"San Francisco, CA\")")
        .interact_text()?;
    let radius: f64 = Input::new()
        .with_prompt("Radius in miles")
        .default("50".to_string())
        .interact_text()?
        .parse()?;

    let mut resolver = GeocodeResolver::new(lookup_client()?, LOOKUP_DELAY);
    let matches = find_within_radius(&mut resolver, &profiles, &center, radius).await;

    println!(
        "{} of {} candidates within {radius} miles of {center}:",
        matches.len(),
        profiles.len()
    );
    for hit in &matches {
        println!(
            "  {:>8.2} mi  {}  ({})",
            hit.distance_miles,
            hit.profile.name.as_deref().unwrap_or("(unnamed)"),
            hit.profile.location.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

/// Groups candidates by resolved city and prints bucket sizes.
pub async fn group_by_city() -> Result<(), Box<dyn Error>> {
    let profiles = load_profiles(&prompt_profiles_path()?)?;

    let mut resolver = GeocodeResolver::new(lookup_client()?, LOOKUP_DELAY);
    let groups = group_candidates(&mut resolver, &profiles).await;

    println!("{} cities:", groups.len());
    for (city, members) in &groups {
        println!("  {city}: {}", members.len());
        for member in members {
            println!(
                "    {}  ({})",
                member.profile.name.as_deref().unwrap_or("(unnamed)"),
                member.profile.location.as_deref().unwrap_or("")
            );
        }
    }
    Ok(())
}

/// Transforms a raw candidate batch file into structured profiles.
pub async fn transform_profiles() -> Result<(), Box<dyn Error>> {
    let input: String = Input::new()
        .with_prompt("Raw candidate batch file")
        .interact_text()?;
    let output: String = Input::new()
        .with_prompt("Output profiles file")
        .default(paths::candidate_profiles_path().display().to_string())
        .interact_text()?;
    let limit = prompt_optional_limit("Number of candidates to transform (empty for all)")?;

    let contents = fs::read_to_string(&input)?;
    let mut raw: Vec<RawCandidate> = serde_json::from_str(&contents)?;
    if let Some(limit) = limit
        && limit < raw.len()
    {
        raw.truncate(limit);
    }

    let provider = llm_provider()?;

    let mut profiles = Vec::with_capacity(raw.len());
    let mut failures = 0;
    for (i, candidate) in raw.iter().enumerate() {
        log::info!(
            "Transforming {}/{}: {}",
            i + 1,
            raw.len(),
            candidate.name.as_deref().unwrap_or("(unnamed)")
        );
        match talent_map_ai::profile::extract_profile(&provider, candidate).await {
            Ok(profile) => profiles.push(profile),
            Err(e) => {
                log::error!(
                    "Skipping {}: {e}",
                    candidate.id.as_deref().unwrap_or("(no id)")
                );
                failures += 1;
            }
        }
    }

    fs::write(&output, serde_json::to_string_pretty(&profiles)?)?;
    println!(
        "{} profiles written to {output} ({failures} skipped)",
        profiles.len()
    );
    Ok(())
}
