use futures::{StreamExt, TryStreamExt, stream};
use thiserror::Error;
use tracing::debug;

use meridian_geocoding::{GeocodeError, GeocodingProvider};

use crate::model::Location;

/// Concurrent geocoding requests issued by `resolve_all`. Small on purpose:
/// independent inputs may resolve in parallel, but the provider should not
/// be flooded by one route calculation.
const DEFAULT_RESOLVE_CONCURRENCY: usize = 4;

/// Input to resolution: free text to geocode, or coordinates already known
/// to the caller (the "current location" case), which skip the provider.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolveInput {
    Address(String),
    Coordinates {
        latitude: f64,
        longitude: f64,
        label: String,
    },
}

impl ResolveInput {
    pub fn address(text: impl Into<String>) -> Self {
        ResolveInput::Address(text.into())
    }

    /// Classifies raw caller text: a bare "lat,lon" pair (as produced by a
    /// "use current location" control) becomes explicit coordinates,
    /// anything else is treated as an address to geocode.
    pub fn from_raw(text: &str) -> Self {
        if let Some((latitude, longitude)) = parse_coordinate_pair(text) {
            return ResolveInput::Coordinates {
                latitude,
                longitude,
                label: text.trim().to_string(),
            };
        }
        ResolveInput::Address(text.to_string())
    }
}

fn parse_coordinate_pair(text: &str) -> Option<(f64, f64)> {
    let (lat, lon) = text.trim().split_once(',')?;
    let latitude: f64 = lat.trim().parse().ok()?;
    let longitude: f64 = lon.trim().parse().ok()?;

    if (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude) {
        Some((latitude, longitude))
    } else {
        None
    }
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("empty address input")]
    EmptyInput,

    #[error("failed to resolve '{input}': {source}")]
    Geocode {
        input: String,
        source: GeocodeError,
    },
}

impl ResolveError {
    pub fn is_provider_unavailable(&self) -> bool {
        match self {
            ResolveError::EmptyInput => false,
            ResolveError::Geocode { source, .. } => source.is_provider_unavailable(),
        }
    }
}

/// Turns raw inputs into resolved `Location`s. One provider call per
/// free-text input, none for explicit coordinates; no caching here (callers
/// may cache above this layer).
pub struct AddressResolver<G> {
    provider: G,
    concurrency: usize,
}

impl<G: GeocodingProvider> AddressResolver<G> {
    pub fn new(provider: G) -> Self {
        Self {
            provider,
            concurrency: DEFAULT_RESOLVE_CONCURRENCY,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub async fn resolve(&self, input: &ResolveInput) -> Result<Location, ResolveError> {
        match input {
            ResolveInput::Coordinates {
                latitude,
                longitude,
                label,
            } => Ok(Location {
                raw_input: label.clone(),
                display_name: Some(label.clone()),
                formatted_address: format!("{latitude:.5}, {longitude:.5}"),
                latitude: *latitude,
                longitude: *longitude,
            }),
            ResolveInput::Address(text) => {
                let text = text.trim();
                if text.is_empty() {
                    return Err(ResolveError::EmptyInput);
                }

                debug!(input = text, "resolving address");
                let place =
                    self.provider
                        .geocode(text)
                        .await
                        .map_err(|source| ResolveError::Geocode {
                            input: text.to_string(),
                            source,
                        })?;

                Ok(Location {
                    raw_input: text.to_string(),
                    display_name: place.name,
                    formatted_address: place.formatted_address,
                    latitude: place.point.y(),
                    longitude: place.point.x(),
                })
            }
        }
    }

    /// Resolves independent inputs concurrently (bounded), preserving input
    /// order in the output.
    pub async fn resolve_all(&self, inputs: &[ResolveInput]) -> Result<Vec<Location>, ResolveError> {
        stream::iter(inputs.iter().map(|input| self.resolve(input)))
            .buffered(self.concurrency)
            .try_collect()
            .await
    }
}
