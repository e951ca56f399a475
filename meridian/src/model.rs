use serde::{Deserialize, Serialize};

/// A resolved geographic location. Immutable once built; `raw_input` keeps
/// whatever the caller typed so it can be re-displayed or re-edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub raw_input: String,
    pub display_name: Option<String>,
    pub formatted_address: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn point(&self) -> geo_types::Point {
        geo_types::Point::new(self.longitude, self.latitude)
    }

    pub fn same_coordinates(&self, other: &Location) -> bool {
        self.latitude == other.latitude && self.longitude == other.longitude
    }
}

impl From<&Location> for geo_types::Point {
    fn from(location: &Location) -> Self {
        location.point()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopRole {
    Start,
    Intermediate,
    End,
}

/// A location with its role and position in the final visiting sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStop {
    pub location: Location,
    pub role: StopRole,
    pub position: usize,

    /// Place name when known, else a shortened formatted address.
    pub display_name: String,
}

/// Travel segment between consecutive stops. `from_stop` / `to_stop` index
/// into `OptimizedRouteResult::ordered_stops`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteLeg {
    pub from_stop: usize,
    pub to_stop: usize,
    pub distance_meters: f64,
    pub distance_text: String,
    pub duration_seconds: f64,
    pub duration_text: String,
    pub traffic_duration_seconds: Option<f64>,
}

/// Final value handed back to the caller; the caller owns any persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizedRouteResult {
    pub ordered_stops: Vec<RouteStop>,
    pub legs: Vec<RouteLeg>,
    pub total_distance_meters: f64,
    pub total_distance_text: String,
    pub estimated_time_seconds: f64,
    pub estimated_time_text: String,
    pub is_round_trip: bool,
    pub traffic_considered: bool,

    /// Proxy-based estimate of distance avoided versus visiting the stops in
    /// the order they were given. Zero when the input order was already best.
    pub estimated_meters_saved: f64,

    /// Snapshot of the raw request, for caller-side re-display and re-edit.
    pub inputs: RouteInputs,
}

/// Raw request as the caller supplied it. `end` may be omitted only for a
/// round trip, where the core computes the effective end itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteInputs {
    pub start: String,
    pub end: Option<String>,
    pub stops: Vec<String>,
    pub is_round_trip: bool,
    pub include_traffic: bool,
}

/// Unit system for the human-readable distance strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceUnit {
    #[default]
    Metric,
    Imperial,
}
