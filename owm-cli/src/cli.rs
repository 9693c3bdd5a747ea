use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use owm_core::{Config, CurrentWeatherClient, Weather};
use tracing::debug;

use crate::output;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "owm", version, about = "Current weather from OpenWeatherMap")]
pub struct Cli {
    /// API key; overrides the configured one.
    #[arg(long, global = true, env = "OWM_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeatherMap API key.
    Configure {
        /// Key to store; prompted for when omitted.
        #[arg(long = "key")]
        key: Option<String>,
    },

    /// Current weather at a latitude/longitude in decimal degrees.
    #[command(allow_negative_numbers = true)]
    Coords {
        lat: f64,
        lon: f64,

        #[command(flatten)]
        format: Format,
    },

    /// Current weather for a city and ISO country code, e.g. `owm city Madrid ES`.
    City {
        city: String,
        country: String,

        #[command(flatten)]
        format: Format,
    },
}

#[derive(Debug, Args)]
pub struct Format {
    /// Print the raw weather document as JSON.
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure { key } => configure(key),
            Command::Coords { lat, lon, format } => {
                let client = client(self.api_key.as_deref())?;
                let weather = client
                    .by_coordinates(lat, lon)
                    .await
                    .with_context(|| format!("Failed to fetch weather at ({lat}, {lon})"))?;
                print_weather(&weather, &format)
            }
            Command::City {
                city,
                country,
                format,
            } => {
                let client = client(self.api_key.as_deref())?;
                let weather = client
                    .by_city_and_country(&city, &country)
                    .await
                    .with_context(|| format!("Failed to fetch weather for {city}, {country}"))?;
                print_weather(&weather, &format)
            }
        }
    }
}

fn configure(key: Option<String>) -> Result<()> {
    let mut cfg = Config::load()?;

    let key = match key {
        Some(key) => key,
        None => inquire::Password::new("OpenWeatherMap API key:")
            .without_confirmation()
            .with_display_mode(inquire::PasswordDisplayMode::Masked)
            .prompt()
            .context("Failed to read API key")?,
    };

    cfg.set_api_key(&key)?;
    let path = cfg.save()?;
    println!("Saved API key to {}", path.display());

    Ok(())
}

fn client(api_key_override: Option<&str>) -> Result<CurrentWeatherClient> {
    let mut cfg = Config::load()?;
    apply_api_key_override(&mut cfg, api_key_override)?;
    cfg.client()
}

/// A blank override (e.g. `OWM_API_KEY=`) counts as not given.
fn apply_api_key_override(cfg: &mut Config, api_key_override: Option<&str>) -> Result<()> {
    if let Some(key) = api_key_override.filter(|key| !key.trim().is_empty()) {
        debug!("using API key from command line or environment");
        cfg.set_api_key(key)?;
    }

    Ok(())
}

fn print_weather(weather: &Weather, format: &Format) -> Result<()> {
    if format.json {
        let json = serde_json::to_string_pretty(weather).context("Failed to serialize weather")?;
        println!("{json}");
    } else {
        let text = output::render(weather).context("Failed to format weather")?;
        print!("{text}");
    }

    Ok(())
}
