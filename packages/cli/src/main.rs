#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Interactive CLI orchestrator for the talent map toolchain.
//!
//! A single entry point that walks the location pipeline stages
//! (extract, standardize, retry, LLM fallback, merge, geocode) and the
//! candidate-facing tools (radius search, city grouping, profile
//! transformation) through `dialoguer` menus.
//!
//! Uses `indicatif-log-bridge` (via
//! [`talent_map_cli_utils::init_logger`]) so log lines and progress
//! bars never fight for the terminal.

mod candidates;
mod locations;

use dialoguer::Select;

/// Top-level tool selection.
enum Tool {
    ExtractLocations,
    Standardize,
    RetryFailed,
    Fallback,
    MergeFallback,
    Geocode,
    RadiusSearch,
    GroupByCity,
    TransformProfiles,
}

impl Tool {
    const ALL: &[Self] = &[
        Self::ExtractLocations,
        Self::Standardize,
        Self::RetryFailed,
        Self::Fallback,
        Self::MergeFallback,
        Self::Geocode,
        Self::RadiusSearch,
        Self::GroupByCity,
        Self::TransformProfiles,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::ExtractLocations => "Extract locations from batch files",
            Self::Standardize => "Standardize locations",
            Self::RetryFailed => "Retry failed standardizations",
            Self::Fallback => "LLM fallback for failed locations",
            Self::MergeFallback => "Merge fallback results",
            Self::Geocode => "Geocode standardized locations",
            Self::RadiusSearch => "Search candidates by radius",
            Self::GroupByCity => "Group candidates by city",
            Self::TransformProfiles => "Transform candidates into profiles",
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = talent_map_cli_utils::init_logger();

    println!("Talent Map Toolchain");
    println!();

    let labels: Vec<&str> = Tool::ALL.iter().map(Tool::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match Tool::ALL[idx] {
        Tool::ExtractLocations => locations::extract()?,
        Tool::Standardize => locations::standardize(&multi).await?,
        Tool::RetryFailed => locations::retry_failed(&multi).await?,
        Tool::Fallback => locations::fallback().await?,
        Tool::MergeFallback => locations::merge_fallback()?,
        Tool::Geocode => locations::geocode(&multi).await?,
        Tool::RadiusSearch => candidates::radius_search().await?,
        Tool::GroupByCity => candidates::group_by_city().await?,
        Tool::TransformProfiles => candidates::transform_profiles().await?,
    }

    Ok(())
}

/// Chat model for the fallback and profile tools.
const LLM_MODEL: &str = "gpt-4o-mini";

fn lookup_client() -> Result<talent_map_geocoder::locationiq::LookupClient, Box<dyn std::error::Error>> {
    let api_key = std::env::var("LOCATIONIQ_API_KEY")
        .map_err(|_| "LOCATIONIQ_API_KEY is not set; export your LocationIQ API key first")?;
    Ok(talent_map_geocoder::locationiq::LookupClient::new(
        reqwest::Client::new(),
        api_key,
    ))
}

fn llm_provider() -> Result<talent_map_ai::providers::OpenAiProvider, Box<dyn std::error::Error>> {
    let api_key = std::env::var("OPENAI_API_KEY")
        .map_err(|_| "OPENAI_API_KEY is not set; export your OpenAI API key first")?;
    Ok(talent_map_ai::providers::OpenAiProvider::new(
        reqwest::Client::new(),
        api_key,
        LLM_MODEL.to_string(),
    ))
}

fn prompt_optional_limit(prompt: &str) -> Result<Option<usize>, Box<dyn std::error::Error>> {
    let input: String = dialoguer::Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;

    if input.trim().is_empty() {
        Ok(None)
    } else {
        Ok(Some(input.trim().parse()?))
    }
}
