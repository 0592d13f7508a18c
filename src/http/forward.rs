//! Upstream forwarding for the proxy route.
//!
//! # Responsibilities
//! - Relay the inbound body, unparsed, to the fixed upstream URL
//! - Relay the upstream body back untouched on success
//! - Collapse every upstream failure into one `UpstreamError`
//! - Render failures as `{"error": "<message>"}` with status 500
//!
//! # Design Decisions
//! - Upstream address comes from config, never from the inbound request
//! - Bodies are fully buffered in both directions
//! - No retries; one inbound request is exactly one upstream attempt

use std::error::Error as _;
use std::time::Duration;

use axum::{
    body::Bytes,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::UpstreamConfig;
use crate::http::server::ServerError;

/// Content type used for every response on the proxy route.
pub const APPLICATION_JSON: &str = "application/json";

/// Body of every error response produced by the proxy route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub error: String,
}

impl ErrorPayload {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Any failure while contacting or reading from the upstream.
///
/// Connection errors, timeouts, non-2xx statuses and truncated bodies are
/// not distinguished; they all render as the same 500.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct UpstreamError {
    message: String,
}

impl UpstreamError {
    /// Error for an upstream that answered with a non-success status.
    pub fn status(status: StatusCode) -> Self {
        Self {
            message: format!(
                "HTTP Error {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            ),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        // reqwest's own Display hides the cause ("error sending request"),
        // so fold in the whole source chain.
        let mut message = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        Self { message }
    }
}

impl IntoResponse for UpstreamError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorPayload::new(self.message)),
        )
            .into_response()
    }
}

/// Problems with the inbound request itself, detected before any upstream call.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("Content-Length header is required")]
    MissingLength,

    #[error("invalid Content-Length header: {0:?}")]
    InvalidLength(String),

    #[error("request body of {length} bytes exceeds the {limit} byte limit")]
    TooLarge { length: u64, limit: usize },

    #[error("failed to read request body: {0}")]
    Body(String),
}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::MissingLength => StatusCode::LENGTH_REQUIRED,
            RequestError::InvalidLength(_) | RequestError::Body(_) => StatusCode::BAD_REQUEST,
            RequestError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(ErrorPayload::new(self.to_string()))).into_response()
    }
}

/// Read the caller-supplied Content-Length and check it against `limit`.
pub fn content_length(headers: &HeaderMap, limit: usize) -> Result<u64, RequestError> {
    let raw = headers
        .get(header::CONTENT_LENGTH)
        .ok_or(RequestError::MissingLength)?;
    let text = raw
        .to_str()
        .map_err(|_| RequestError::InvalidLength(String::from_utf8_lossy(raw.as_bytes()).into_owned()))?;
    let length: u64 = text
        .trim()
        .parse()
        .map_err(|_| RequestError::InvalidLength(text.to_string()))?;

    if length > limit as u64 {
        return Err(RequestError::TooLarge { length, limit });
    }
    Ok(length)
}

/// What the upstream sent back on success.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    /// Upstream's own status; the client always sees 200.
    pub status: StatusCode,
    pub body: Bytes,
}

impl IntoResponse for UpstreamResponse {
    fn into_response(self) -> Response {
        (
            StatusCode::OK,
            [(header::CONTENT_TYPE, APPLICATION_JSON)],
            self.body,
        )
            .into_response()
    }
}

/// Forwards request bodies to the configured upstream.
#[derive(Debug, Clone)]
pub struct ProxyForwarder {
    client: reqwest::Client,
    upstream: reqwest::Url,
}

impl ProxyForwarder {
    /// Build a forwarder for the given upstream.
    pub fn new(config: &UpstreamConfig) -> Result<Self, ServerError> {
        let upstream = reqwest::Url::parse(&config.url)?;

        let mut builder = reqwest::Client::builder().no_proxy();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = config.connect_timeout_secs {
            builder = builder.connect_timeout(Duration::from_secs(secs));
        }
        let client = builder.build().map_err(ServerError::Client)?;

        Ok(Self { client, upstream })
    }

    pub fn upstream(&self) -> &reqwest::Url {
        &self.upstream
    }

    /// POST `body` to the upstream byte-for-byte and return its reply.
    pub async fn forward(&self, body: Bytes) -> Result<UpstreamResponse, UpstreamError> {
        let response = self
            .client
            .post(self.upstream.clone())
            .header(header::CONTENT_TYPE, APPLICATION_JSON)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::status(status));
        }

        let body = response.bytes().await?;
        Ok(UpstreamResponse { status, body })
    }
}
