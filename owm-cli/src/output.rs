use chrono::{DateTime, Utc};
use owm_core::Weather;
use std::fmt::Write;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M UTC";

/// Human-readable multi-line summary of a weather snapshot.
pub fn render(weather: &Weather) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    let m = &weather.measurements;

    writeln!(
        out,
        "{}, {} ({:.2}, {:.2})",
        weather.location_name,
        weather.location_meta.country,
        weather.coordinates.latitude,
        weather.coordinates.longitude,
    )?;
    writeln!(out, "Observed:    {}", format_time(weather.observed_at_utc()))?;

    let conditions = weather
        .conditions
        .iter()
        .map(|c| c.description.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    writeln!(
        out,
        "Conditions:  {}",
        if conditions.is_empty() { "unknown" } else { conditions.as_str() }
    )?;

    writeln!(
        out,
        "Temperature: {:.2} K ({:.1} °C), min {:.1} °C, max {:.1} °C",
        m.temperature,
        m.temperature_celsius(),
        m.temperature_min_celsius(),
        m.temperature_max_celsius(),
    )?;
    writeln!(out, "Pressure:    {} hPa", m.pressure)?;
    writeln!(out, "Humidity:    {}%", m.humidity)?;
    writeln!(
        out,
        "Wind:        {} m/s from {}° ({})",
        weather.wind.speed,
        weather.wind.direction,
        compass_point(weather.wind.direction),
    )?;
    writeln!(out, "Cloudiness:  {}%", weather.cloudiness.percent)?;
    if weather.precipitation.three_hours > 0.0 {
        writeln!(out, "Rain (3h):   {} mm", weather.precipitation.three_hours)?;
    }
    writeln!(out, "Sunrise:     {}", format_time(weather.sunrise_utc()))?;
    writeln!(out, "Sunset:      {}", format_time(weather.sunset_utc()))?;

    Ok(out)
}

fn format_time(ts: Option<DateTime<Utc>>) -> String {
    ts.map(|t| t.format(TIME_FORMAT).to_string())
        .unwrap_or_else(|| "n/a".to_string())
}

fn compass_point(degrees: f64) -> &'static str {
    const POINTS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];
    let idx = ((degrees.rem_euclid(360.0) + 22.5) / 45.0) as usize % POINTS.len();
    POINTS[idx]
}
