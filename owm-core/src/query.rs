use url::{Url, form_urlencoded};

use crate::error::WeatherError;

pub const DEFAULT_BASE_URL: &str = "http://api.openweathermap.org/data/2.5";

/// What to ask the provider for.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Query<'a> {
    ByCoordinates { lat: f64, lon: f64 },
    ByCityAndCountry { city: &'a str, country_code: &'a str },
}

impl Query<'_> {
    /// Build the request URL below `base`. Each value is percent-encoded on
    /// its own, so the `,` joining city and country stays literal while a
    /// `,`, `&` or non-ASCII character inside a name is escaped.
    pub(crate) fn to_url(&self, base: &Url, api_key: &str) -> Url {
        let mut url = base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("weather");
        }

        let query = match self {
            Query::ByCoordinates { lat, lon } => format!(
                "lat={}&lon={}",
                encode(&format!("{lat:.6}")),
                encode(&format!("{lon:.6}"))
            ),
            Query::ByCityAndCountry { city, country_code } => {
                format!("q={},{}", encode(city), encode(country_code))
            }
        };
        url.set_query(Some(&format!("{query}&APPID={}", encode(api_key))));

        url
    }
}

fn encode(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// Parse and check a provider base URL such as [`DEFAULT_BASE_URL`].
pub(crate) fn parse_base_url(raw: &str) -> Result<Url, WeatherError> {
    let url = Url::parse(raw)?;
    if url.cannot_be_a_base() {
        return Err(WeatherError::UnsupportedBaseUrl(raw.to_string()));
    }
    Ok(url)
}
