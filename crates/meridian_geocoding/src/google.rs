use std::sync::Arc;
use std::time::Duration;

use geo_types::Point;
use serde::Deserialize;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::provider::{GeocodeError, GeocodedPlace, GeocodingProvider};

pub const GOOGLE_GEOCODE_API_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

/// How many runner-up addresses an ambiguity error carries back to the
/// caller for disambiguation.
const MAX_AMBIGUOUS_CANDIDATES: usize = 3;

/// Concurrent in-flight geocoding requests, shared across clones of the
/// client so parallel route calculations draw from one rate-limit budget.
const DEFAULT_REQUEST_PERMITS: usize = 4;

#[derive(Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeHit>,
    error_message: Option<String>,
}

#[derive(Deserialize)]
struct GeocodeHit {
    formatted_address: String,
    geometry: Geometry,
    #[serde(default)]
    partial_match: bool,
}

#[derive(Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

pub struct GoogleGeocodingClientParams {
    pub api_key: String,
    pub language: String,
    pub timeout: Duration,
}

impl GoogleGeocodingClientParams {
    /// Reads `GOOGLE_MAPS_API_KEY` from the environment; the binary is
    /// expected to have loaded its dotenv file already.
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            api_key: std::env::var("GOOGLE_MAPS_API_KEY")?,
            language: "en".to_string(),
            timeout: Duration::from_secs(10),
        })
    }
}

#[derive(Clone)]
pub struct GoogleGeocodingClient {
    params: Arc<GoogleGeocodingClientParams>,
    client: reqwest::Client,
    permits: Arc<Semaphore>,
}

impl GoogleGeocodingClient {
    pub fn new(params: GoogleGeocodingClientParams) -> Self {
        Self {
            params: Arc::new(params),
            client: reqwest::Client::new(),
            permits: Arc::new(Semaphore::new(DEFAULT_REQUEST_PERMITS)),
        }
    }

    async fn request(&self, query: &str) -> Result<GeocodeResponse, GeocodeError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .expect("request permit semaphore is never closed");

        let response = self
            .client
            .get(GOOGLE_GEOCODE_API_URL)
            .query(&[
                ("address", query),
                ("language", &self.params.language),
                ("key", &self.params.api_key),
            ])
            .timeout(self.params.timeout)
            .send()
            .await
            .map_err(map_request_error)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(GeocodeError::Api { status, message });
        }

        response.json().await.map_err(map_request_error)
    }
}

impl GeocodingProvider for GoogleGeocodingClient {
    async fn geocode(&self, query: &str) -> Result<GeocodedPlace, GeocodeError> {
        debug!(query, "geocoding request");
        let response = self.request(query).await?;
        decode_response(response)
    }
}

fn map_request_error(error: reqwest::Error) -> GeocodeError {
    if error.is_timeout() {
        GeocodeError::Timeout
    } else {
        GeocodeError::Request(error)
    }
}

fn decode_response(response: GeocodeResponse) -> Result<GeocodedPlace, GeocodeError> {
    match response.status.as_str() {
        "OK" => {}
        "ZERO_RESULTS" => return Err(GeocodeError::NoMatch),
        other => {
            return Err(GeocodeError::Api {
                status: 200,
                message: format!(
                    "{}: {}",
                    other,
                    response.error_message.unwrap_or_default()
                ),
            });
        }
    }

    let mut hits = response.results;
    if hits.is_empty() {
        return Err(GeocodeError::NoMatch);
    }

    // Several partial matches means the provider guessed; hand the
    // candidates back instead of silently picking one.
    if hits.len() > 1 && hits[0].partial_match {
        let candidates = hits
            .iter()
            .take(MAX_AMBIGUOUS_CANDIDATES)
            .map(|hit| hit.formatted_address.clone())
            .collect();
        return Err(GeocodeError::Ambiguous { candidates });
    }

    let hit = hits.swap_remove(0);
    Ok(GeocodedPlace {
        name: None,
        formatted_address: hit.formatted_address,
        point: Point::new(hit.geometry.location.lng, hit.geometry.location.lat),
    })
}
