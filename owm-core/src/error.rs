use thiserror::Error;

/// Boxed error produced by a [`Transport`](crate::transport::Transport).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors returned by [`CurrentWeatherClient`](crate::CurrentWeatherClient).
#[derive(Debug, Error)]
pub enum WeatherError {
    /// The request never produced a response (DNS, connect, timeout, body read).
    #[error("failed to reach weather provider: {0}")]
    Transport(#[source] BoxError),

    /// The provider answered with a status other than 200.
    #[error("provider responded with status {status}: {}", truncate_body(.body))]
    Provider { status: u16, body: String },

    /// A 200 response whose body is not a weather document.
    #[error("failed to decode weather response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),

    #[error("base URL cannot carry a path: {0}")]
    UnsupportedBaseUrl(String),
}

impl WeatherError {
    /// HTTP status reported by the provider, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            WeatherError::Provider { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, WeatherError::Transport(_))
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, WeatherError::Decode(_))
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
