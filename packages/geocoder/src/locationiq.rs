//! `LocationIQ` search client.
//!
//! Speaks the Nominatim-compatible `search.php` endpoint: a free-text
//! query returns a JSON array of candidate matches with string-encoded
//! coordinates. Absence of results is an empty array, not an error.
//!
//! See <https://locationiq.com/docs> for the endpoint contract.

use crate::{AddressDetails, CoordinateMatch, GeocodeError, PlaceMatch};

/// Default public endpoint for the `LocationIQ` search API.
pub const DEFAULT_BASE_URL: &str = "https://us1.locationiq.com/v1/search.php";

/// A `LocationIQ` search client bound to one API key.
///
/// The `reqwest::Client` is injected so every component in a run shares
/// one connection pool.
pub struct LookupClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl LookupClient {
    /// Creates a client against the default public endpoint.
    #[must_use]
    pub fn new(client: reqwest::Client, api_key: String) -> Self {
        Self::with_base_url(client, api_key, DEFAULT_BASE_URL.to_string())
    }

    /// Creates a client against a custom endpoint (self-hosted
    /// Nominatim, test server).
    #[must_use]
    pub const fn with_base_url(client: reqwest::Client, api_key: String, base_url: String) -> Self {
        Self {
            client,
            base_url,
            api_key,
        }
    }

    /// Looks up the single best match with full address breakdown.
    ///
    /// Returns `Ok(None)` when the provider has no match for the query.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the HTTP request or response parsing
    /// fails, or [`GeocodeError::RateLimited`] on HTTP 429.
    pub async fn search_structured(&self, query: &str) -> Result<Option<PlaceMatch>, GeocodeError> {
        let body = self.search(query, true).await?;
        parse_structured(&body)
    }

    /// Looks up coordinates only (`addressdetails=0`) for the geocode
    /// pass. The display name falls back to `query` when absent.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the HTTP request or response parsing
    /// fails, or [`GeocodeError::RateLimited`] on HTTP 429.
    pub async fn search_coordinates(
        &self,
        query: &str,
    ) -> Result<Option<CoordinateMatch>, GeocodeError> {
        let body = self.search(query, false).await?;
        parse_coordinates(&body, query)
    }

    async fn search(
        &self,
        query: &str,
        address_details: bool,
    ) -> Result<serde_json::Value, GeocodeError> {
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("q", query),
                ("format", "json"),
                ("limit", "1"),
                ("addressdetails", if address_details { "1" } else { "0" }),
            ])
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GeocodeError::RateLimited);
        }

        Ok(resp.json().await?)
    }
}

/// Parses a structured (`addressdetails=1`) response body.
fn parse_structured(body: &serde_json::Value) -> Result<Option<PlaceMatch>, GeocodeError> {
    let results = body.as_array().ok_or_else(|| GeocodeError::Parse {
        message: "search response is not an array".to_string(),
    })?;

    let Some(first) = results.first() else {
        return Ok(None);
    };

    let latitude = parse_coord(first, "lat")?;
    let longitude = parse_coord(first, "lon")?;

    let address = first.get("address").map_or_else(AddressDetails::default, |a| AddressDetails {
        city: str_field(a, "city"),
        town: str_field(a, "town"),
        village: str_field(a, "village"),
        suburb: str_field(a, "suburb"),
        state: str_field(a, "state"),
        province: str_field(a, "province"),
        county: str_field(a, "county"),
        country: str_field(a, "country"),
        country_code: str_field(a, "country_code"),
    });

    Ok(Some(PlaceMatch {
        display_name: first["display_name"].as_str().unwrap_or_default().to_string(),
        address,
        latitude,
        longitude,
        importance: first["importance"].as_f64().unwrap_or(0.0),
    }))
}

/// Parses a coordinates-only (`addressdetails=0`) response body.
fn parse_coordinates(
    body: &serde_json::Value,
    query: &str,
) -> Result<Option<CoordinateMatch>, GeocodeError> {
    let results = body.as_array().ok_or_else(|| GeocodeError::Parse {
        message: "search response is not an array".to_string(),
    })?;

    let Some(first) = results.first() else {
        return Ok(None);
    };

    Ok(Some(CoordinateMatch {
        lat: parse_coord(first, "lat")?,
        lng: parse_coord(first, "lon")?,
        display_name: first["display_name"]
            .as_str()
            .map_or_else(|| query.to_string(), ToString::to_string),
        importance: first["importance"].as_f64().unwrap_or(0.0),
    }))
}

/// Coordinates arrive as strings ("37.7749"); occasionally as numbers.
fn parse_coord(value: &serde_json::Value, key: &str) -> Result<f64, GeocodeError> {
    value[key]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .or_else(|| value[key].as_f64())
        .ok_or_else(|| GeocodeError::Parse {
            message: format!("missing {key} in search response"),
        })
}

/// Non-empty string field, `None` for absent or empty.
fn str_field(value: &serde_json::Value, key: &str) -> Option<String> {
    value[key]
        .as_str()
        .filter(|s| !s.is_empty())
        .map(String::from)
}
