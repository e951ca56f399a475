pub mod google;
pub mod provider;
pub mod retry;

pub use google::{GoogleDirectionsClient, GoogleDirectionsClientParams};
pub use provider::{DirectionsError, DirectionsProvider, ProviderLeg, RouteRequestOptions};
pub use retry::RetryPolicy;
