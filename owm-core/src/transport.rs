//! HTTP seam between the facade and the network.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, StatusCode, header::CONTENT_TYPE};
use std::fmt::Debug;
use url::Url;

use crate::error::BoxError;

/// Status line plus a not-yet-read body.
pub struct TransportResponse {
    pub status: StatusCode,
    pub body: Box<dyn ResponseBody>,
}

impl Debug for TransportResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportResponse")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// Response body stream. Dropping it releases the underlying connection.
#[async_trait]
pub trait ResponseBody: Send {
    /// Drain the body. Called at most once per response.
    async fn read_to_end(&mut self) -> Result<Bytes, BoxError>;
}

/// Issues GET requests on behalf of [`CurrentWeatherClient`](crate::CurrentWeatherClient).
///
/// Implementations must be safe to share between tasks.
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    async fn get(&self, url: Url) -> Result<TransportResponse, BoxError>;
}

/// Default transport backed by a pooled [`reqwest::Client`].
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    http: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reuse an existing client, e.g. one shared with other services.
    pub fn with_client(http: Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: Url) -> Result<TransportResponse, BoxError> {
        let res = self
            .http
            .get(url)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;

        Ok(TransportResponse {
            status: res.status(),
            body: Box::new(ReqwestBody(Some(res))),
        })
    }
}

struct ReqwestBody(Option<reqwest::Response>);

#[async_trait]
impl ResponseBody for ReqwestBody {
    async fn read_to_end(&mut self) -> Result<Bytes, BoxError> {
        match self.0.take() {
            Some(res) => Ok(res.bytes().await?),
            None => Ok(Bytes::new()),
        }
    }
}
