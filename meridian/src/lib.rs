pub mod assembler;
pub mod model;
pub mod resolver;
pub mod service;

mod format;

pub use meridian_directions as directions;
pub use meridian_geocoding as geocoding;
pub use meridian_optimizer as optimizer;

pub use model::{
    DistanceUnit, Location, OptimizedRouteResult, RouteInputs, RouteLeg, RouteStop, StopRole,
};
pub use resolver::{AddressResolver, ResolveError, ResolveInput};
pub use service::{RouteCalculationError, RouteCalculatorService, Stage};
