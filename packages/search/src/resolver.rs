//! Free-text location resolution with a per-run cache.
//!
//! The resolver wraps a lookup client behind [`LocationLookup`] so the
//! search functions can be exercised against canned results, and caches
//! every answer (including misses) keyed by the raw query string, so a
//! population where many candidates share a location string costs one
//! network call per distinct string.
//!
//! The cache lives only as long as the resolver; a new run starts cold
//! and sees fresh provider data.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use talent_map_geocoder::GeocodeError;
use talent_map_geocoder::locationiq::LookupClient;
use talent_map_location_models::ResolvedLocation;

/// A source of resolved locations for free-text queries.
#[async_trait]
pub trait LocationLookup: Send + Sync {
    /// Resolves `query` to a location, `Ok(None)` when the provider has
    /// no match.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] on transport or parse failure.
    async fn lookup(&self, query: &str) -> Result<Option<ResolvedLocation>, GeocodeError>;
}

#[async_trait]
impl LocationLookup for LookupClient {
    async fn lookup(&self, query: &str) -> Result<Option<ResolvedLocation>, GeocodeError> {
        Ok(self.search_structured(query).await?.map(|hit| ResolvedLocation {
            lat: hit.latitude,
            lon: hit.longitude,
            formatted_address: hit.display_name,
            city: hit.address.city.unwrap_or_default(),
            state: hit.address.state.unwrap_or_default(),
            country: hit.address.country.unwrap_or_default(),
        }))
    }
}

/// A caching resolver over a [`LocationLookup`].
pub struct GeocodeResolver<L> {
    lookup: L,
    delay: Duration,
    cache: HashMap<String, Option<ResolvedLocation>>,
}

impl<L: LocationLookup> GeocodeResolver<L> {
    /// Creates a resolver that waits `delay` before each network call
    /// (cache hits pay nothing).
    #[must_use]
    pub fn new(lookup: L, delay: Duration) -> Self {
        Self {
            lookup,
            delay,
            cache: HashMap::new(),
        }
    }

    /// Resolves `query`, consulting the cache first.
    ///
    /// Lookup failures are logged and treated as no-match; proximity
    /// search and grouping drop unresolvable entries rather than abort
    /// a whole population over one bad string.
    pub async fn resolve(&mut self, query: &str) -> Option<ResolvedLocation> {
        if query.is_empty() {
            return None;
        }
        if let Some(cached) = self.cache.get(query) {
            return cached.clone();
        }

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let resolved = match self.lookup.lookup(query).await {
            Ok(hit) => hit,
            Err(e) => {
                log::warn!("Failed to resolve \"{query}\": {e}");
                None
            }
        };

        self.cache.insert(query.to_string(), resolved.clone());
        resolved
    }
}
