#![warn(missing_docs)]
//! # label-check-submit
//!
//! ## Purpose
//! Sends one label submission to the verification endpoint and classifies the
//! reply.
//!
//! ## Responsibilities
//! - Resolve the `/api/submit-label` endpoint from a configured base URL.
//! - POST the JSON payload through an injectable [`SubmitTransport`].
//! - Fold transport failures into a local [`Resolution`], never an error.
//!
//! ## Data flow
//! [`SubmissionPayload`] -> JSON bytes -> [`SubmitTransport::post_json`] ->
//! [`HttpReply`] -> [`classify_response`] -> [`Resolution`].
//!
//! ## Error model
//! Endpoint and client construction fail with [`TransportError`]. Once a
//! submission is under way every failure becomes a [`Resolution`] with
//! `ok == false`; there is exactly one attempt and no retry.

use std::future::Future;
use std::time::Duration;

use label_check_core::{SubmissionPayload, submission_fingerprint};
use label_check_verdict::{Resolution, TRANSPORT_FAILURE_MESSAGE, classify_response};
use reqwest::header::CONTENT_TYPE;
use thiserror::Error;
pub use url::Url;

/// Path of the submission route below the configured base URL.
pub const SUBMIT_LABEL_PATH: &str = "/api/submit-label";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Resolved submission endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitEndpoint {
    url: Url,
}

impl SubmitEndpoint {
    /// Appends [`SUBMIT_LABEL_PATH`] to `base`.
    ///
    /// # Errors
    /// Returns [`TransportError::InvalidEndpoint`] when `base` is not an
    /// absolute `http`/`https` URL.
    pub fn from_base(base: &str) -> Result<Self, TransportError> {
        let base = base.trim().trim_end_matches('/');
        if base.is_empty() {
            return Err(TransportError::InvalidEndpoint(
                "base url is empty".to_string(),
            ));
        }

        let url = Url::parse(&format!("{base}{SUBMIT_LABEL_PATH}"))
            .map_err(|error| TransportError::InvalidEndpoint(format!("{base}: {error}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(TransportError::InvalidEndpoint(format!(
                "unsupported scheme {}",
                url.scheme()
            )));
        }

        Ok(Self { url })
    }

    /// Full endpoint URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Returns `true` when the endpoint uses HTTPS.
    pub fn is_secure(&self) -> bool {
        self.url.scheme() == "https"
    }
}

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: Vec<u8>,
}

/// Transport used to deliver the submission.
pub trait SubmitTransport {
    /// POSTs `body` as `application/json` to `url`.
    ///
    /// Any completed exchange, whatever its status, is `Ok`. `Err` means no
    /// response was received.
    fn post_json(
        &self,
        url: &Url,
        body: Vec<u8>,
    ) -> impl Future<Output = Result<HttpReply, TransportError>>;
}

/// `reqwest` backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Builds a transport with a per-request timeout.
    ///
    /// # Errors
    /// Returns [`TransportError::Client`] when the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| TransportError::Client(error.to_string()))?;
        Ok(Self { client })
    }
}

impl SubmitTransport for HttpTransport {
    async fn post_json(&self, url: &Url, body: Vec<u8>) -> Result<HttpReply, TransportError> {
        let response = self
            .client
            .post(url.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        Ok(HttpReply {
            status,
            body: body.to_vec(),
        })
    }
}

fn map_reqwest_error(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout
    } else if error.is_connect() {
        TransportError::Connect(error.to_string())
    } else {
        TransportError::Request(error.to_string())
    }
}

/// Sends one payload and classifies the reply.
pub async fn submit_payload<T: SubmitTransport>(
    transport: &T,
    endpoint: &SubmitEndpoint,
    payload: &SubmissionPayload,
) -> Resolution {
    let fingerprint = submission_fingerprint(payload);
    let body = match payload.to_json_bytes() {
        Ok(body) => body,
        Err(error) => {
            tracing::error!(%fingerprint, "payload encoding failed: {error}");
            return Resolution::failure(TRANSPORT_FAILURE_MESSAGE);
        }
    };

    tracing::info!(
        %fingerprint,
        endpoint = %endpoint.url(),
        bytes = body.len(),
        "submitting label"
    );

    match transport.post_json(endpoint.url(), body).await {
        Ok(reply) => {
            let resolution = classify_response(reply.status, &reply.body);
            tracing::info!(
                %fingerprint,
                status = reply.status,
                ok = resolution.ok,
                inconsistencies = resolution.inconsistencies().len(),
                "submission resolved"
            );
            resolution
        }
        Err(error) => {
            tracing::warn!(%fingerprint, "submission transport failure: {error}");
            Resolution::failure(TRANSPORT_FAILURE_MESSAGE)
        }
    }
}

/// Transport layer errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Base URL is unusable.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
    /// HTTP client could not be constructed.
    #[error("http client setup failed: {0}")]
    Client(String),
    /// Connection could not be established.
    #[error("connection failed: {0}")]
    Connect(String),
    /// Request exceeded the configured timeout.
    #[error("request timed out")]
    Timeout,
    /// Any other failure before a full response was read.
    #[error("request failed: {0}")]
    Request(String),
}
