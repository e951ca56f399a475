use thiserror::Error;

/// A geocoded place as returned by a provider. `name` is a place label when
/// the provider knows one; callers fall back to the formatted address.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedPlace {
    pub name: Option<String>,
    pub formatted_address: String,
    pub point: geo_types::Point,
}

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("no match for the given address")]
    NoMatch,

    #[error("address is ambiguous, {} candidates", candidates.len())]
    Ambiguous { candidates: Vec<String> },

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),

    #[error("geocoding request timed out")]
    Timeout,
}

impl GeocodeError {
    /// True when the provider itself was unreachable or misbehaving, as
    /// opposed to the input being wrong. Callers use this to pick between
    /// "fix the address" and "try again later".
    pub fn is_provider_unavailable(&self) -> bool {
        match self {
            GeocodeError::NoMatch | GeocodeError::Ambiguous { .. } => false,
            GeocodeError::Request(_)
            | GeocodeError::Api { .. }
            | GeocodeError::Deserialize(_)
            | GeocodeError::Timeout => true,
        }
    }
}

pub trait GeocodingProvider {
    fn geocode(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<GeocodedPlace, GeocodeError>> + Send;
}
