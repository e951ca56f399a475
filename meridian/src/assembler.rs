use thiserror::Error;

use meridian_directions::ProviderLeg;

use crate::{
    format::{format_distance, format_duration, shorten_address},
    model::{
        DistanceUnit, Location, OptimizedRouteResult, RouteInputs, RouteLeg, RouteStop, StopRole,
    },
};

#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("leg count mismatch: {ordered} ordered stops require {} legs, provider returned {legs}", ordered.saturating_sub(1))]
    LegCountMismatch { ordered: usize, legs: usize },
}

/// Combines the ordered locations and the routed legs into the final result.
///
/// `savings_ratio` is the proxy-estimated fraction by which the unoptimized
/// order would have been longer; it scales the routed total into
/// `estimated_meters_saved`.
pub fn assemble(
    ordered_locations: Vec<Location>,
    provider_legs: Vec<ProviderLeg>,
    is_round_trip: bool,
    traffic_considered: bool,
    savings_ratio: f64,
    unit: DistanceUnit,
    inputs: RouteInputs,
) -> Result<OptimizedRouteResult, AssemblyError> {
    // Guards against a provider handing back partial data.
    if ordered_locations.len() < 2 || provider_legs.len() != ordered_locations.len() - 1 {
        return Err(AssemblyError::LegCountMismatch {
            ordered: ordered_locations.len(),
            legs: provider_legs.len(),
        });
    }

    let last = ordered_locations.len() - 1;
    let ordered_stops: Vec<RouteStop> = ordered_locations
        .into_iter()
        .enumerate()
        .map(|(position, location)| {
            let role = if position == 0 {
                StopRole::Start
            } else if position == last {
                StopRole::End
            } else {
                StopRole::Intermediate
            };
            let display_name = location
                .display_name
                .clone()
                .unwrap_or_else(|| shorten_address(&location.formatted_address));

            RouteStop {
                location,
                role,
                position,
                display_name,
            }
        })
        .collect();

    let mut total_distance_meters = 0.0;
    let mut estimated_time_seconds = 0.0;

    let legs: Vec<RouteLeg> = provider_legs
        .into_iter()
        .enumerate()
        .map(|(index, leg)| {
            total_distance_meters += leg.distance_meters;
            estimated_time_seconds += leg
                .traffic_duration_seconds
                .unwrap_or(leg.duration_seconds);

            RouteLeg {
                from_stop: index,
                to_stop: index + 1,
                distance_meters: leg.distance_meters,
                distance_text: leg.distance_text,
                duration_seconds: leg.duration_seconds,
                duration_text: leg.duration_text,
                traffic_duration_seconds: leg.traffic_duration_seconds,
            }
        })
        .collect();

    let estimated_meters_saved = (total_distance_meters * savings_ratio).max(0.0);

    Ok(OptimizedRouteResult {
        total_distance_text: format_distance(total_distance_meters, unit),
        estimated_time_text: format_duration(estimated_time_seconds),
        ordered_stops,
        legs,
        total_distance_meters,
        estimated_time_seconds,
        is_round_trip,
        traffic_considered,
        estimated_meters_saved,
        inputs,
    })
}
