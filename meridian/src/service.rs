use thiserror::Error;
use tracing::{debug, info, instrument};

use meridian_directions::{DirectionsError, DirectionsProvider, RouteRequestOptions};
use meridian_geocoding::GeocodingProvider;
use meridian_optimizer::{OptimizeError, OptimizedOrder, optimize};

use crate::{
    assembler::{AssemblyError, assemble},
    model::{DistanceUnit, Location, OptimizedRouteResult, RouteInputs},
    resolver::{AddressResolver, ResolveError, ResolveInput},
};

/// Pipeline stage a failure originated in. The pipeline is strictly
/// sequential; any failure is terminal for the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validating,
    Resolving,
    Optimizing,
    Routing,
    Assembling,
}

#[derive(Debug, Error)]
pub enum RouteCalculationError {
    #[error("invalid input: {0}")]
    Input(String),

    #[error("address resolution failed: {0}")]
    Resolve(#[from] ResolveError),

    #[error("order optimization failed: {0}")]
    Optimize(#[from] OptimizeError),

    #[error("directions request failed: {0}")]
    Directions(#[from] DirectionsError),

    #[error("route assembly failed: {0}")]
    Assembly(#[from] AssemblyError),

    #[error("route calculation was cancelled")]
    Cancelled,
}

impl RouteCalculationError {
    /// Stage the failure originated in; `None` for cancellation, which can
    /// interrupt any stage.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            RouteCalculationError::Input(_) => Some(Stage::Validating),
            RouteCalculationError::Resolve(_) => Some(Stage::Resolving),
            RouteCalculationError::Optimize(_) => Some(Stage::Optimizing),
            RouteCalculationError::Directions(_) => Some(Stage::Routing),
            RouteCalculationError::Assembly(_) => Some(Stage::Assembling),
            RouteCalculationError::Cancelled => None,
        }
    }

    /// The caller can fix this by changing the request (bad address, no
    /// drivable connection, missing field).
    pub fn is_user_fixable(&self) -> bool {
        match self {
            RouteCalculationError::Input(_) | RouteCalculationError::Optimize(_) => true,
            RouteCalculationError::Resolve(error) => !error.is_provider_unavailable(),
            RouteCalculationError::Directions(error) => {
                matches!(error, DirectionsError::NoRouteFound)
            }
            RouteCalculationError::Assembly(_) | RouteCalculationError::Cancelled => false,
        }
    }

    /// The same request may succeed later; worth offering a retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            RouteCalculationError::Resolve(error) => error.is_provider_unavailable(),
            RouteCalculationError::Directions(error) => error.is_transient(),
            _ => false,
        }
    }
}

/// Facade over the whole pipeline: resolve -> optimize -> route -> assemble.
///
/// Stateless across calls; each invocation builds everything fresh and
/// either returns a complete result or the first failing stage's error.
/// Dependencies are injected, never looked up globally.
pub struct RouteCalculatorService<G, D> {
    resolver: AddressResolver<G>,
    directions: D,
    unit: DistanceUnit,
}

impl<G, D> RouteCalculatorService<G, D>
where
    G: GeocodingProvider,
    D: DirectionsProvider,
{
    pub fn new(geocoder: G, directions: D) -> Self {
        Self {
            resolver: AddressResolver::new(geocoder),
            directions,
            unit: DistanceUnit::default(),
        }
    }

    pub fn with_unit(mut self, unit: DistanceUnit) -> Self {
        self.unit = unit;
        self
    }

    #[instrument(skip_all, fields(stops = request.stops.len(), round_trip = request.is_round_trip))]
    pub async fn calculate_optimized_route(
        &self,
        request: &RouteInputs,
    ) -> Result<OptimizedRouteResult, RouteCalculationError> {
        self.run_pipeline(request).await
    }

    /// Like `calculate_optimized_route`, but races the pipeline against a
    /// caller-supplied cancellation future. Cancellation aborts outstanding
    /// provider calls and drops all partial results.
    pub async fn calculate_optimized_route_cancellable(
        &self,
        request: &RouteInputs,
        cancel: impl Future<Output = ()>,
    ) -> Result<OptimizedRouteResult, RouteCalculationError> {
        tokio::select! {
            result = self.run_pipeline(request) => result,
            _ = cancel => Err(RouteCalculationError::Cancelled),
        }
    }

    async fn run_pipeline(
        &self,
        request: &RouteInputs,
    ) -> Result<OptimizedRouteResult, RouteCalculationError> {
        // Validating
        if request.start.trim().is_empty() {
            return Err(RouteCalculationError::Input(
                "a start location is required".to_string(),
            ));
        }
        let end_input = match (&request.end, request.is_round_trip) {
            // The effective end of a round trip is the start; an end field
            // supplied alongside the flag is ignored rather than trusted.
            (_, true) => None,
            (Some(end), false) if !end.trim().is_empty() => Some(end),
            _ => {
                return Err(RouteCalculationError::Input(
                    "an end location is required unless the route is a round trip".to_string(),
                ));
            }
        };

        // Resolving
        let mut resolve_inputs = Vec::with_capacity(request.stops.len() + 2);
        resolve_inputs.push(ResolveInput::from_raw(&request.start));
        resolve_inputs.extend(request.stops.iter().map(|s| ResolveInput::from_raw(s)));
        if let Some(end) = end_input {
            resolve_inputs.push(ResolveInput::from_raw(end));
        }

        let mut resolved = self.resolver.resolve_all(&resolve_inputs).await?;

        let end = end_input.and_then(|_| resolved.pop());
        let start = resolved.remove(0);
        let stops = resolved;
        debug!(resolved = stops.len() + 2, "locations resolved");

        // Optimizing
        let stop_points: Vec<geo_types::Point> = stops.iter().map(Location::point).collect();
        let order = optimize(
            start.point(),
            end.as_ref().map(Location::point),
            &stop_points,
            request.is_round_trip,
        )?;
        let savings_ratio = savings_ratio(&order);

        let mut ordered: Vec<Location> = Vec::with_capacity(stops.len() + 2);
        ordered.push(start.clone());
        ordered.extend(order.stop_order.iter().map(|&i| stops[i].clone()));
        ordered.push(match end {
            Some(end) => end,
            None => start,
        });

        // Routing: one request for the whole fixed sequence.
        let waypoints: Vec<geo_types::Point> = ordered.iter().map(Location::point).collect();
        let legs = self
            .directions
            .fetch_route(
                &waypoints,
                &RouteRequestOptions {
                    consider_traffic: request.include_traffic,
                },
            )
            .await?;

        // Assembling
        let result = assemble(
            ordered,
            legs,
            request.is_round_trip,
            request.include_traffic,
            savings_ratio,
            self.unit,
            request.clone(),
        )?;

        info!(
            stops = result.ordered_stops.len(),
            total = %result.total_distance_text,
            eta = %result.estimated_time_text,
            "route calculated"
        );

        Ok(result)
    }
}

/// Fraction by which the input order's proxy cost exceeds the chosen
/// order's. Zero when the stops were already in the best order (or when
/// every waypoint coincides and the proxy cost is zero).
fn savings_ratio(order: &OptimizedOrder) -> f64 {
    if order.optimized_cost <= 0.0 {
        return 0.0;
    }
    (order.input_order_cost / order.optimized_cost - 1.0).max(0.0)
}
