//! Current weather document as returned by `/data/2.5/weather`.
//!
//! Field names on the wire are fixed by the provider; the Rust names are
//! mapped with `serde(rename)`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const KELVIN_OFFSET: f64 = 273.15;

/// Snapshot of current conditions for one location at one instant.
///
/// The provider leaves out whole sections (and fields such as `sys.country`
/// over open water), so every missing field decodes to its zero value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weather {
    #[serde(rename = "coord")]
    pub coordinates: Coordinates,

    /// Providers may report more than one simultaneous condition.
    #[serde(rename = "weather")]
    pub conditions: Vec<Condition>,

    /// Internal provider parameter, usually "stations".
    pub base: String,

    #[serde(rename = "main")]
    pub measurements: Measurements,

    pub wind: Wind,

    #[serde(rename = "clouds")]
    pub cloudiness: Cloudiness,

    /// Absent when it has not rained.
    #[serde(rename = "rain")]
    pub precipitation: Precipitation,

    /// Unix timestamp of the observation.
    #[serde(rename = "dt")]
    pub observed_at: u32,

    #[serde(rename = "sys")]
    pub location_meta: LocationMeta,

    #[serde(rename = "id")]
    pub location_id: i64,

    #[serde(rename = "name")]
    pub location_name: String,

    #[serde(rename = "cod")]
    pub response_code: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Coordinates {
    #[serde(rename = "lon")]
    pub longitude: f64,
    #[serde(rename = "lat")]
    pub latitude: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Condition {
    pub id: i64,
    pub main: String,
    pub description: String,
    /// Icon reference, e.g. "01d".
    pub icon: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Measurements {
    /// Kelvin unless the request asked for other units.
    #[serde(rename = "temp")]
    pub temperature: f64,
    pub pressure: f64,
    pub humidity: f64,
    #[serde(rename = "temp_min")]
    pub temperature_min: f64,
    #[serde(rename = "temp_max")]
    pub temperature_max: f64,
}

impl Measurements {
    pub fn temperature_celsius(&self) -> f64 {
        self.temperature - KELVIN_OFFSET
    }

    pub fn temperature_min_celsius(&self) -> f64 {
        self.temperature_min - KELVIN_OFFSET
    }

    pub fn temperature_max_celsius(&self) -> f64 {
        self.temperature_max - KELVIN_OFFSET
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Wind {
    pub speed: f64,
    #[serde(rename = "deg")]
    pub direction: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cloudiness {
    #[serde(rename = "all")]
    pub percent: u8,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Precipitation {
    /// Accumulation over the last three hours, in mm.
    #[serde(rename = "3h")]
    pub three_hours: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationMeta {
    #[serde(rename = "type")]
    pub kind: i64,
    pub id: i64,
    pub message: f64,
    /// Empty for locations outside any country, e.g. open ocean.
    pub country: String,
    pub sunrise: i64,
    pub sunset: i64,
}

impl Weather {
    /// First reported condition, if the provider sent any.
    pub fn primary_condition(&self) -> Option<&Condition> {
        self.conditions.first()
    }

    pub fn observed_at_utc(&self) -> Option<DateTime<Utc>> {
        unix_to_utc(i64::from(self.observed_at))
    }

    pub fn sunrise_utc(&self) -> Option<DateTime<Utc>> {
        unix_to_utc(self.location_meta.sunrise)
    }

    pub fn sunset_utc(&self) -> Option<DateTime<Utc>> {
        unix_to_utc(self.location_meta.sunset)
    }
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(ts, 0)
}
