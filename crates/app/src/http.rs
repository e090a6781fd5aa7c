//! Backend HTTP client.
//!
//! Thin wrapper around [`reqwest::Client`] that knows the backend base URL,
//! stamps every request with an `x-request-id`, bounds every request with a
//! timeout and turns non-2xx responses into [`HttpError::Status`].

use std::{
    error::Error as StdError,
    time::{Duration, Instant},
};

use humanize_duration::{Truncate, prelude::DurationExt};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::{Instrument, debug, info_span, warn};
use uuid::Uuid;

/// Header carrying the per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Default bound on a single backend request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Boxed transport failure.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Connection settings for the commerce backend.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Backend base URL, e.g. `"http://localhost:8080"`.
    pub base_url: String,

    /// Upper bound on a single request, connect to last body byte.
    pub timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Errors raised when building an [`HttpClient`].
#[derive(Debug, Error)]
pub enum HttpClientError {
    #[error("invalid backend url {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("failed to build http client")]
    Build(#[source] reqwest::Error),
}

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum HttpError {
    /// The request could not be delivered or the connection failed.
    #[error("transport error: {0}")]
    Transport(#[source] BoxError),

    /// The request exceeded the configured timeout.
    #[error("request timed out")]
    Timeout(#[source] BoxError),

    /// The backend answered with a non-2xx status.
    #[error(
        "backend responded with status {status}{}",
        .reason.as_deref().map(|reason| format!(": {reason}")).unwrap_or_default()
    )]
    Status {
        status: StatusCode,
        reason: Option<String>,
    },

    /// The response body did not match the expected shape.
    #[error("failed to decode response body: {0}")]
    Decode(#[source] BoxError),
}

impl HttpError {
    /// Status code of a non-2xx response.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Reason parsed from a `{ "error": "..." }` response body.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Status { reason, .. } => reason.as_deref(),
            _ => None,
        }
    }

    /// Check if the backend answered 404.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    /// Check if the backend refused the request with a 4xx.
    pub fn is_client_error(&self) -> bool {
        self.status().is_some_and(|status| status.is_client_error())
    }
}

impl From<reqwest::Error> for HttpError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout(Box::new(error))
        } else if error.is_decode() {
            Self::Decode(Box::new(error))
        } else {
            Self::Transport(Box::new(error))
        }
    }
}

impl From<serde_json::Error> for HttpError {
    fn from(error: serde_json::Error) -> Self {
        Self::Decode(Box::new(error))
    }
}

/// A binary response body with its declared content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryBody {
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// HTTP client bound to one backend.
#[derive(Debug, Clone)]
pub struct HttpClient {
    base_url: Url,
    http: Client,
}

impl HttpClient {
    /// Create a new client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the base URL is not an absolute http(s) URL or the
    /// underlying client cannot be built.
    pub fn new(config: &HttpConfig) -> Result<Self, HttpClientError> {
        let base_url = Url::parse(&config.base_url).map_err(|error| {
            HttpClientError::InvalidBaseUrl {
                url: config.base_url.clone(),
                reason: error.to_string(),
            }
        })?;

        if base_url.cannot_be_a_base() {
            return Err(HttpClientError::InvalidBaseUrl {
                url: config.base_url.clone(),
                reason: "url cannot carry a path".to_string(),
            });
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(HttpClientError::Build)?;

        Ok(Self { base_url, http })
    }

    /// The configured base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
    ) -> Result<T, HttpError> {
        let response = self.send(Method::GET, segments, None::<&()>).await?;

        decode(response).await
    }

    pub(crate) async fn post_json<B, T>(&self, segments: &[&str], body: &B) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(Method::POST, segments, Some(body)).await?;

        decode(response).await
    }

    pub(crate) async fn post_empty<T: DeserializeOwned>(
        &self,
        segments: &[&str],
    ) -> Result<T, HttpError> {
        let response = self.send(Method::POST, segments, None::<&()>).await?;

        decode(response).await
    }

    pub(crate) async fn put_json<B, T>(&self, segments: &[&str], body: &B) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(Method::PUT, segments, Some(body)).await?;

        decode(response).await
    }

    pub(crate) async fn get_bytes(&self, segments: &[&str]) -> Result<BinaryBody, HttpError> {
        let response = self.send(Method::GET, segments, None::<&()>).await?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let bytes = response.bytes().await?;

        Ok(BinaryBody {
            content_type,
            bytes: bytes.to_vec(),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();

        // `new` rejects cannot-be-a-base URLs, so this always succeeds.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }

        url
    }

    async fn send<B>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
    ) -> Result<Response, HttpError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.endpoint(segments);
        let request_id = Uuid::now_v7();
        let span = info_span!(
            "backend_request",
            %method,
            path = url.path(),
            %request_id,
        );

        let mut request: RequestBuilder = self
            .http
            .request(method, url)
            .header(REQUEST_ID_HEADER, request_id.to_string());

        if let Some(body) = body {
            request = request.json(body);
        }

        async move {
            let started = Instant::now();
            let result = request.send().await;
            let elapsed = started.elapsed().human(Truncate::Nano).to_string();

            let response = match result {
                Ok(response) => response,
                Err(error) => {
                    warn!(%error, %elapsed, "backend request failed");

                    return Err(HttpError::from(error));
                }
            };

            let status = response.status();

            debug!(%status, %elapsed, "backend responded");

            if status.is_success() {
                return Ok(response);
            }

            let reason = error_reason(response).await;

            Err(HttpError::Status { status, reason })
        }
        .instrument(span)
        .await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, HttpError> {
    let bytes = response.bytes().await?;

    Ok(serde_json::from_slice(&bytes)?)
}

async fn error_reason(response: Response) -> Option<String> {
    let body = response.text().await.ok()?;

    parse_error_reason(&body)
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(alias = "message")]
    error: String,
}

fn parse_error_reason(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .map(|body| body.error.trim().to_string())
        .filter(|reason| !reason.is_empty())
}
