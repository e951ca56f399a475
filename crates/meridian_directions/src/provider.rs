use thiserror::Error;

/// One routed segment between two consecutive waypoints of the fixed
/// sequence. Texts are the provider's locale-aware display strings.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderLeg {
    pub distance_meters: f64,
    pub distance_text: String,
    pub duration_seconds: f64,
    pub duration_text: String,

    /// Traffic-aware duration, present only when the request asked for
    /// traffic and the provider had data for the leg.
    pub traffic_duration_seconds: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RouteRequestOptions {
    pub consider_traffic: bool,
}

#[derive(Debug, Error)]
pub enum DirectionsError {
    #[error("no route found between the given waypoints")]
    NoRouteFound,

    #[error("rate limited by the directions provider")]
    RateLimited,

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),

    #[error("directions request timed out")]
    Timeout,

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("at least two waypoints are required, got {0}")]
    InvalidWaypoints(usize),
}

impl DirectionsError {
    /// Transient failures are worth another attempt after a backoff;
    /// everything else is permanent and surfaces immediately.
    pub fn is_transient(&self) -> bool {
        match self {
            DirectionsError::RateLimited | DirectionsError::Timeout => true,
            DirectionsError::Api { status, .. } => *status >= 500,
            DirectionsError::Request(error) => {
                error.is_timeout() || error.is_connect()
            }
            DirectionsError::NoRouteFound
            | DirectionsError::Deserialize(_)
            | DirectionsError::MalformedResponse(_)
            | DirectionsError::InvalidWaypoints(_) => false,
        }
    }
}

/// Fetches routed legs for an already-ordered waypoint sequence. The
/// sequence is authoritative: implementations must not let the provider
/// re-order waypoints.
pub trait DirectionsProvider {
    fn fetch_route(
        &self,
        waypoints: &[geo_types::Point],
        options: &RouteRequestOptions,
    ) -> impl Future<Output = Result<Vec<ProviderLeg>, DirectionsError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(DirectionsError::RateLimited.is_transient());
        assert!(DirectionsError::Timeout.is_transient());
        assert!(
            DirectionsError::Api {
                status: 503,
                message: String::new()
            }
            .is_transient()
        );

        assert!(!DirectionsError::NoRouteFound.is_transient());
        assert!(
            !DirectionsError::Api {
                status: 400,
                message: String::new()
            }
            .is_transient()
        );
        assert!(!DirectionsError::MalformedResponse("x".into()).is_transient());
        assert!(!DirectionsError::InvalidWaypoints(1).is_transient());
    }
}
