//! Core library for the `owm` CLI.
//!
//! This crate is a facade over the OpenWeatherMap current weather API:
//! - [`CurrentWeatherClient`] hides URL building, the HTTP round trip,
//!   status checking and JSON decoding behind two calls
//! - [`Weather`] is the decoded snapshot
//! - [`WeatherError`] tells transport, provider and decode failures apart
//! - [`Config`] persists the API key between runs
//!
//! ```no_run
//! # async fn demo() -> Result<(), owm_core::WeatherError> {
//! let client = owm_core::CurrentWeatherClient::new("my-api-key")?;
//! let weather = client.by_city_and_country("Madrid", "ES").await?;
//! println!("{}: {:.1} K", weather.location_name, weather.measurements.temperature);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod model;
mod query;
pub mod transport;

pub use client::{CurrentWeatherClient, CurrentWeatherRetriever, UNREADABLE_BODY};
pub use config::Config;
pub use error::{BoxError, WeatherError};
pub use model::{
    Cloudiness, Condition, Coordinates, LocationMeta, Measurements, Precipitation, Weather, Wind,
};
pub use query::DEFAULT_BASE_URL;
pub use transport::{ReqwestTransport, ResponseBody, Transport, TransportResponse};
