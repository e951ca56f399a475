use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::{
    provider::{DirectionsError, DirectionsProvider, ProviderLeg, RouteRequestOptions},
    retry::RetryPolicy,
};

pub const GOOGLE_DIRECTIONS_API_URL: &str = "https://maps.googleapis.com/maps/api/directions/json";

/// Concurrent in-flight requests allowed against the provider, shared
/// across clones of the client so parallel route calculations draw from one
/// rate-limit budget.
const DEFAULT_REQUEST_PERMITS: usize = 2;

#[derive(Deserialize)]
struct DirectionsResponse {
    status: String,
    #[serde(default)]
    routes: Vec<Route>,
    error_message: Option<String>,
}

#[derive(Deserialize)]
struct Route {
    legs: Vec<Leg>,
}

#[derive(Deserialize)]
struct Leg {
    distance: TextValue,
    duration: TextValue,
    duration_in_traffic: Option<TextValue>,
}

#[derive(Deserialize)]
struct TextValue {
    text: String,
    value: f64,
}

pub struct GoogleDirectionsClientParams {
    pub api_key: String,
    pub timeout: Duration,
    pub retry: RetryPolicy,
    pub request_permits: usize,
}

impl GoogleDirectionsClientParams {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            api_key: std::env::var("GOOGLE_MAPS_API_KEY")?,
            timeout: Duration::from_secs(20),
            retry: RetryPolicy::default(),
            request_permits: DEFAULT_REQUEST_PERMITS,
        })
    }
}

#[derive(Clone)]
pub struct GoogleDirectionsClient {
    params: Arc<GoogleDirectionsClientParams>,
    client: reqwest::Client,
    permits: Arc<Semaphore>,
}

impl GoogleDirectionsClient {
    pub fn new(params: GoogleDirectionsClientParams) -> Self {
        let permits = Arc::new(Semaphore::new(params.request_permits));
        Self {
            params: Arc::new(params),
            client: reqwest::Client::new(),
            permits,
        }
    }

    async fn request_once(
        &self,
        waypoints: &[geo_types::Point],
        options: &RouteRequestOptions,
    ) -> Result<DirectionsResponse, DirectionsError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .expect("request permit semaphore is never closed");

        let origin = format_point(&waypoints[0]);
        let destination = format_point(&waypoints[waypoints.len() - 1]);

        // No `optimize:true` prefix: the sequence was fixed upstream and the
        // provider must not re-order it.
        let via = waypoints[1..waypoints.len() - 1]
            .iter()
            .map(format_point)
            .collect::<Vec<_>>()
            .join("|");

        let mut query = vec![
            ("origin", origin),
            ("destination", destination),
            ("mode", "driving".to_string()),
            ("key", self.params.api_key.clone()),
        ];
        if !via.is_empty() {
            query.push(("waypoints", via));
        }
        if options.consider_traffic {
            query.push(("departure_time", "now".to_string()));
        }

        let response = self
            .client
            .get(GOOGLE_DIRECTIONS_API_URL)
            .query(&query)
            .timeout(self.params.timeout)
            .send()
            .await
            .map_err(map_request_error)?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(DirectionsError::RateLimited);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(DirectionsError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response.json().await.map_err(map_request_error)
    }
}

impl DirectionsProvider for GoogleDirectionsClient {
    async fn fetch_route(
        &self,
        waypoints: &[geo_types::Point],
        options: &RouteRequestOptions,
    ) -> Result<Vec<ProviderLeg>, DirectionsError> {
        if waypoints.len() < 2 {
            return Err(DirectionsError::InvalidWaypoints(waypoints.len()));
        }

        debug!(
            waypoints = waypoints.len(),
            traffic = options.consider_traffic,
            "directions request"
        );

        let response = self
            .params
            .retry
            .run(|| self.request_once(waypoints, options))
            .await?;

        decode_response(response, waypoints.len())
    }
}

fn format_point(point: &geo_types::Point) -> String {
    // Provider expects "lat,lng"
    format!("{},{}", point.y(), point.x())
}

fn map_request_error(error: reqwest::Error) -> DirectionsError {
    if error.is_timeout() {
        DirectionsError::Timeout
    } else {
        DirectionsError::Request(error)
    }
}

fn decode_response(
    response: DirectionsResponse,
    waypoint_count: usize,
) -> Result<Vec<ProviderLeg>, DirectionsError> {
    match response.status.as_str() {
        "OK" => {}
        "ZERO_RESULTS" | "NOT_FOUND" => return Err(DirectionsError::NoRouteFound),
        "OVER_QUERY_LIMIT" | "OVER_DAILY_LIMIT" => return Err(DirectionsError::RateLimited),
        // The provider's catch-all for server-side trouble; retryable.
        "UNKNOWN_ERROR" => {
            return Err(DirectionsError::Api {
                status: 500,
                message: response.error_message.unwrap_or_default(),
            });
        }
        other => {
            return Err(DirectionsError::Api {
                status: 400,
                message: format!(
                    "{}: {}",
                    other,
                    response.error_message.unwrap_or_default()
                ),
            });
        }
    }

    let route = response
        .routes
        .into_iter()
        .next()
        .ok_or_else(|| DirectionsError::MalformedResponse("OK status with no routes".into()))?;

    if route.legs.len() != waypoint_count - 1 {
        return Err(DirectionsError::MalformedResponse(format!(
            "expected {} legs, provider returned {}",
            waypoint_count - 1,
            route.legs.len()
        )));
    }

    Ok(route
        .legs
        .into_iter()
        .map(|leg| ProviderLeg {
            distance_meters: leg.distance.value,
            distance_text: leg.distance.text,
            duration_seconds: leg.duration.value,
            duration_text: leg.duration.text,
            traffic_duration_seconds: leg.duration_in_traffic.map(|traffic| traffic.value),
        })
        .collect())
}
