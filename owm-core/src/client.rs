use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, instrument};
use url::Url;

use crate::{
    error::WeatherError,
    model::Weather,
    query::{DEFAULT_BASE_URL, Query, parse_base_url},
    transport::{ReqwestTransport, Transport},
};

/// Placeholder carried by [`WeatherError::Provider`] when the error body itself could not be read.
pub const UNREADABLE_BODY: &str = "<response body unavailable>";

/// The two ways of asking for current conditions.
#[async_trait]
pub trait CurrentWeatherRetriever: Send + Sync {
    /// Current weather at decimal latitude/longitude, e.g. `(40.4, -3.7)` for Madrid.
    async fn by_coordinates(&self, lat: f64, lon: f64) -> Result<Weather, WeatherError>;

    /// Current weather for a city and ISO 3166 country code, e.g. `("Madrid", "ES")`.
    async fn by_city_and_country(
        &self,
        city: &str,
        country_code: &str,
    ) -> Result<Weather, WeatherError>;
}

/// Facade over the OpenWeatherMap current weather endpoint.
///
/// Holds no per-call state, so one client can serve concurrent callers.
#[derive(Debug, Clone)]
pub struct CurrentWeatherClient<T = ReqwestTransport> {
    api_key: String,
    base_url: Url,
    transport: T,
}

impl CurrentWeatherClient<ReqwestTransport> {
    /// Create a client for the public OpenWeatherMap endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the default base URL cannot be parsed.
    pub fn new(api_key: impl Into<String>) -> Result<Self, WeatherError> {
        Self::with_transport(api_key, ReqwestTransport::new())
    }
}

impl<T: Transport> CurrentWeatherClient<T> {
    pub fn with_transport(
        api_key: impl Into<String>,
        transport: T,
    ) -> Result<Self, WeatherError> {
        Ok(Self {
            api_key: api_key.into(),
            base_url: parse_base_url(DEFAULT_BASE_URL)?,
            transport,
        })
    }

    /// Point the client at another deployment of the API.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, WeatherError> {
        self.base_url = parse_base_url(base_url)?;
        Ok(self)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn by_coordinates(&self, lat: f64, lon: f64) -> Result<Weather, WeatherError> {
        self.fetch(Query::ByCoordinates { lat, lon }).await
    }

    pub async fn by_city_and_country(
        &self,
        city: &str,
        country_code: &str,
    ) -> Result<Weather, WeatherError> {
        self.fetch(Query::ByCityAndCountry { city, country_code })
            .await
    }

    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, query: Query<'_>) -> Result<Weather, WeatherError> {
        let url = query.to_url(&self.base_url, &self.api_key);

        let response = self
            .transport
            .get(url)
            .await
            .map_err(WeatherError::Transport)?;
        let status = response.status;
        let mut body = response.body;
        debug!(%status, "weather provider responded");

        // Anything but exactly 200 is a failure, other 2xx codes included.
        if status != StatusCode::OK {
            let text = match body.read_to_end().await {
                Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                Err(err) => {
                    debug!(error = %err, "could not read error body");
                    UNREADABLE_BODY.to_string()
                }
            };

            return Err(WeatherError::Provider {
                status: status.as_u16(),
                body: text,
            });
        }

        let bytes = body.read_to_end().await.map_err(WeatherError::Transport)?;
        drop(body);

        let weather: Weather = serde_json::from_slice(&bytes).map_err(WeatherError::Decode)?;
        debug!(location = %weather.location_name, observed_at = weather.observed_at, "decoded weather");

        Ok(weather)
    }
}

#[async_trait]
impl<T: Transport> CurrentWeatherRetriever for CurrentWeatherClient<T> {
    async fn by_coordinates(&self, lat: f64, lon: f64) -> Result<Weather, WeatherError> {
        CurrentWeatherClient::by_coordinates(self, lat, lon).await
    }

    async fn by_city_and_country(
        &self,
        city: &str,
        country_code: &str,
    ) -> Result<Weather, WeatherError> {
        CurrentWeatherClient::by_city_and_country(self, city, country_code).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::BoxError,
        model::tests::MADRID,
        transport::{ResponseBody, TransportResponse},
    };
    use bytes::Bytes;
    use std::sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    };

    #[derive(Debug, Default)]
    struct Counters {
        reads: AtomicUsize,
        drops: AtomicUsize,
    }

    struct CountingBody {
        payload: Result<Vec<u8>, String>,
        counters: Arc<Counters>,
    }

    impl Drop for CountingBody {
        fn drop(&mut self) {
            self.counters.drops.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl ResponseBody for CountingBody {
        async fn read_to_end(&mut self) -> Result<Bytes, BoxError> {
            self.counters.reads.fetch_add(1, Ordering::SeqCst);
            match &self.payload {
                Ok(bytes) => Ok(Bytes::from(bytes.clone())),
                Err(msg) => Err(msg.clone().into()),
            }
        }
    }

    /// Fake transport answering every request with the same canned response.
    #[derive(Debug)]
    struct FakeTransport {
        status: StatusCode,
        payload: Result<Vec<u8>, String>,
        refuse: bool,
        counters: Arc<Counters>,
        requested: Mutex<Vec<Url>>,
    }

    impl FakeTransport {
        fn new(status: u16, body: &str) -> Self {
            Self {
                status: StatusCode::from_u16(status).unwrap(),
                payload: Ok(body.as_bytes().to_vec()),
                refuse: false,
                counters: Arc::default(),
                requested: Mutex::default(),
            }
        }

        fn unreadable(status: u16) -> Self {
            Self {
                payload: Err("connection reset".to_string()),
                ..Self::new(status, "")
            }
        }

        fn refusing() -> Self {
            Self {
                refuse: true,
                ..Self::new(200, "")
            }
        }
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn get(&self, url: Url) -> Result<TransportResponse, BoxError> {
            self.requested.lock().unwrap().push(url);
            if self.refuse {
                return Err("connection refused".into());
            }

            Ok(TransportResponse {
                status: self.status,
                body: Box::new(CountingBody {
                    payload: self.payload.clone(),
                    counters: Arc::clone(&self.counters),
                }),
            })
        }
    }

    fn client(transport: FakeTransport) -> CurrentWeatherClient<FakeTransport> {
        CurrentWeatherClient::with_transport("KEY", transport).unwrap()
    }

    fn assert_released_once(client: &CurrentWeatherClient<FakeTransport>) {
        let counters = &client.transport.counters;
        assert_eq!(counters.reads.load(Ordering::SeqCst), 1, "body read once");
        assert_eq!(counters.drops.load(Ordering::SeqCst), 1, "body released once");
    }

    #[tokio::test]
    async fn success_returns_decoded_weather() {
        let client = client(FakeTransport::new(200, MADRID));

        let weather = client.by_coordinates(40.4, -3.7).await.unwrap();

        assert_eq!(weather.location_name, "Madrid");
        assert_eq!(weather.measurements.temperature, 293.15);
        assert_eq!(weather.conditions[0].main, "Clear");
        assert_released_once(&client);
    }

    #[tokio::test]
    async fn not_found_is_a_provider_error() {
        let client = client(FakeTransport::new(404, "city not found"));

        let err = client.by_city_and_country("Nowhere", "XX").await.unwrap_err();

        match err {
            WeatherError::Provider { status, ref body } => {
                assert_eq!(status, 404);
                assert_eq!(body, "city not found");
            }
            other => panic!("expected provider error, got {other:?}"),
        }
        assert_released_once(&client);
    }

    #[tokio::test]
    async fn created_is_rejected_even_with_valid_body() {
        let client = client(FakeTransport::new(201, MADRID));

        let err = client.by_coordinates(40.4, -3.7).await.unwrap_err();

        assert_eq!(err.status(), Some(201));
        assert_released_once(&client);
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        let client = client(FakeTransport::new(200, "not json"));

        let err = client.by_coordinates(40.4, -3.7).await.unwrap_err();

        assert!(err.is_decode(), "unexpected error: {err:?}");
        assert_released_once(&client);
    }

    #[tokio::test]
    async fn unreadable_error_body_uses_placeholder() {
        let client = client(FakeTransport::unreadable(503));

        let err = client.by_coordinates(0.0, 0.0).await.unwrap_err();

        match err {
            WeatherError::Provider { status, ref body } => {
                assert_eq!(status, 503);
                assert_eq!(body, UNREADABLE_BODY);
            }
            other => panic!("expected provider error, got {other:?}"),
        }
        assert_released_once(&client);
    }

    #[tokio::test]
    async fn unreadable_success_body_is_a_transport_error() {
        let client = client(FakeTransport::unreadable(200));

        let err = client.by_coordinates(0.0, 0.0).await.unwrap_err();

        assert!(err.is_transport(), "unexpected error: {err:?}");
        assert_released_once(&client);
    }

    #[tokio::test]
    async fn refused_connection_is_a_transport_error() {
        let client = client(FakeTransport::refusing());

        let err = client.by_city_and_country("Madrid", "ES").await.unwrap_err();

        assert!(err.is_transport());
        assert!(err.to_string().contains("connection refused"));
        assert_eq!(client.transport.counters.reads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn both_operations_hit_the_weather_endpoint_with_the_key() {
        let client = client(FakeTransport::new(200, MADRID));

        client.by_coordinates(40.4, -3.7).await.unwrap();
        client.by_city_and_country("Madrid", "ES").await.unwrap();

        let requested = client.transport.requested.lock().unwrap();
        assert_eq!(
            requested[0].as_str(),
            "http://api.openweathermap.org/data/2.5/weather?lat=40.400000&lon=-3.700000&APPID=KEY"
        );
        assert_eq!(
            requested[1].as_str(),
            "http://api.openweathermap.org/data/2.5/weather?q=Madrid,ES&APPID=KEY"
        );
    }

    #[tokio::test]
    async fn retriever_trait_delegates_to_client() {
        let client = client(FakeTransport::new(200, MADRID));
        let retriever: &dyn CurrentWeatherRetriever = &client;

        let weather = retriever.by_city_and_country("Madrid", "ES").await.unwrap();

        assert_eq!(weather.location_meta.country, "ES");
    }

    #[test]
    fn default_base_url_is_accepted() {
        let client = CurrentWeatherClient::new("KEY").unwrap();

        assert_eq!(client.base_url().as_str(), DEFAULT_BASE_URL);
    }

    #[test]
    fn custom_base_url_is_validated() {
        let client = CurrentWeatherClient::new("KEY")
            .and_then(|c| c.with_base_url("http://localhost:9000/owm/"))
            .unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:9000/owm/");

        let err = CurrentWeatherClient::new("KEY")
            .and_then(|c| c.with_base_url("::"))
            .unwrap_err();
        assert!(matches!(err, WeatherError::InvalidBaseUrl(_)));
    }
}
