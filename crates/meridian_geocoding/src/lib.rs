pub mod google;
pub mod provider;

pub use google::{GoogleGeocodingClient, GoogleGeocodingClientParams};
pub use provider::{GeocodeError, GeocodedPlace, GeocodingProvider};
