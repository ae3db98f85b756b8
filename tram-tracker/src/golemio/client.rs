//! Golemio HTTP client.
//!
//! The engine builds requests itself and hands them to an [`HttpFetch`]
//! implementation, so the transport can be swapped for a mock in tests.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use super::error::FetchError;

/// Default base URL for the departure board endpoint.
const DEFAULT_BASE_URL: &str = "https://api.golemio.cz/v2/pid/departureboards/";

/// Header carrying the API key.
const API_KEY_HEADER: &str = "x-access-token";

/// Timezone requested for returned timestamps.
pub const PREFERRED_TIMEZONE: &str = "Europe/Prague";

/// Configuration for talking to Golemio.
#[derive(Debug, Clone)]
pub struct GolemioConfig {
    /// Departure board endpoint
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl GolemioConfig {
    /// Create a config pointing at production Golemio.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 15,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for GolemioConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// A fully built GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
}

/// Status and body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Capability to perform an HTTP GET.
///
/// Implementations report transport failures as `Err`; any response that
/// arrives, whatever its status, is `Ok`.
pub trait HttpFetch: Send + Sync {
    fn get(
        &self,
        request: &FetchRequest,
    ) -> impl Future<Output = Result<HttpResponse, FetchError>> + Send;
}

impl<T: HttpFetch> HttpFetch for Arc<T> {
    fn get(
        &self,
        request: &FetchRequest,
    ) -> impl Future<Output = Result<HttpResponse, FetchError>> + Send {
        (**self).get(request)
    }
}

/// A departure board query for one station.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartureBoardQuery<'a> {
    /// Station name as shown on the stop, e.g. "Kobylisy"
    pub station: &'a str,
    /// Maximum number of departures to return
    pub limit: u32,
}

impl<'a> DepartureBoardQuery<'a> {
    pub fn new(station: &'a str, limit: u32) -> Self {
        Self { station, limit }
    }

    /// Build the GET request, authenticating with `api_key`.
    pub fn to_request(
        &self,
        config: &GolemioConfig,
        api_key: &str,
    ) -> Result<FetchRequest, FetchError> {
        let limit = self.limit.to_string();
        let url = reqwest::Url::parse_with_params(
            &config.base_url,
            [
                ("names", self.station),
                ("limit", limit.as_str()),
                ("preferredTimezone", PREFERRED_TIMEZONE),
            ],
        )
        .map_err(|e| FetchError::InvalidUrl {
            url: config.base_url.clone(),
            message: e.to_string(),
        })?;

        Ok(FetchRequest {
            url: url.into(),
            headers: vec![(API_KEY_HEADER.to_string(), api_key.to_string())],
        })
    }
}

/// [`HttpFetch`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    http: reqwest::Client,
}

impl ReqwestFetcher {
    /// Create a fetcher using the config's timeout.
    pub fn new(config: &GolemioConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { http })
    }
}

impl HttpFetch for ReqwestFetcher {
    async fn get(&self, request: &FetchRequest) -> Result<HttpResponse, FetchError> {
        let mut builder = self.http.get(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(HttpResponse { status, body })
    }
}
