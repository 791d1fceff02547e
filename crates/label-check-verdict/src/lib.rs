#![warn(missing_docs)]
//! # label-check-verdict
//!
//! ## Purpose
//! Defines the verification response schema and the submission outcome model.
//!
//! ## Responsibilities
//! - Decode the verdict carried in the endpoint's `result` value.
//! - Classify raw HTTP replies into a [`Resolution`].
//! - Apply the display rule that turns a successful call with inconsistencies
//!   into an error.
//!
//! ## Data flow
//! HTTP status + body -> [`classify_response`] -> [`Resolution`] stored in
//! [`Outcome::Resolved`] -> UI banner projection.
//!
//! ## Ownership and lifetimes
//! Parsed values are owned so they outlive the transient response buffer.
//!
//! ## Error model
//! Decoding is lenient: unknown keys are ignored, a malformed `imageExtracted`
//! is dropped on its own so the `errors` list survives, and a `result` whose
//! `errors` list is unusable is dropped with a warning. Only a 2xx body that is not JSON at all changes the
//! classification (see [`classify_response`]).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message for a submit attempted on an incomplete form.
pub const INCOMPLETE_FORM_MESSAGE: &str = "Please fill all fields and attach an image.";
/// Message for a request that never produced a usable response.
pub const TRANSPORT_FAILURE_MESSAGE: &str = "Failed to reach the server";
/// Message for an accepted submission.
pub const SUBMITTED_MESSAGE: &str = "Submitted successfully";
/// Message for an image that could not be read at submit time.
pub const IMAGE_READ_FAILURE_MESSAGE: &str = "Failed to read the label image.";

/// Backend judgment of consistency between form data and label image.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Verdict {
    /// Inconsistency descriptions; empty means fully consistent.
    pub errors: Vec<String>,
    /// Fields the backend read off the label, when extraction succeeded.
    #[serde(rename = "imageExtracted", skip_serializing_if = "Option::is_none")]
    pub image_extracted: Option<ExtractedLabel>,
}

impl Verdict {
    /// Returns `true` when no inconsistency was reported.
    pub fn is_consistent(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Label fields extracted from the image by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractedLabel {
    /// Brand name found on the label.
    pub brand_name: Option<String>,
    /// Product class found on the label.
    pub product_class: Option<String>,
    /// Alcohol content, for example `40%`.
    pub alcohol_content: Option<String>,
    /// Net contents, for example `750 mL`.
    pub net_contents: Option<String>,
    /// Whether the government health warning was found.
    pub health_warning: bool,
    /// Raw text tokens recognized on the label.
    pub all_text: Vec<String>,
    /// Concatenated label text.
    pub full_text: Option<String>,
}

/// Resolved result of one submission attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    /// Whether the backend accepted the submission.
    pub ok: bool,
    /// Human-readable status message.
    pub message: String,
    /// Verdict carried by a successful response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<Verdict>,
}

impl Resolution {
    /// Builds a failed resolution with `message`.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            verdict: None,
        }
    }

    /// Builds a successful resolution carrying `verdict`.
    pub fn submitted(verdict: Option<Verdict>) -> Self {
        Self {
            ok: true,
            message: SUBMITTED_MESSAGE.to_string(),
            verdict,
        }
    }

    /// Inconsistencies reported by the backend, empty when none.
    pub fn inconsistencies(&self) -> &[String] {
        self.verdict
            .as_ref()
            .map(|verdict| verdict.errors.as_slice())
            .unwrap_or_default()
    }

    /// Display rule: error when the call failed or the verdict lists
    /// inconsistencies.
    pub fn shows_error(&self) -> bool {
        !self.ok || !self.inconsistencies().is_empty()
    }
}

/// Submission state owned by the form.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Outcome {
    /// Nothing submitted since creation or reset.
    #[default]
    Idle,
    /// Request is in flight.
    InFlight,
    /// Last attempt resolved.
    Resolved(Resolution),
}

impl Outcome {
    /// Returns `true` while a request is in flight.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Outcome::InFlight)
    }

    /// Returns the resolution of the last attempt, if any.
    pub fn resolution(&self) -> Option<&Resolution> {
        match self {
            Outcome::Resolved(resolution) => Some(resolution),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    #[serde(default)]
    result: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RawVerdict {
    #[serde(default)]
    errors: Option<Vec<String>>,
    #[serde(default, rename = "imageExtracted")]
    image_extracted: Option<serde_json::Value>,
}

/// Builds a verdict from an already decoded `result` value.
///
/// `errors` decides success or failure. A mistyped `imageExtracted` is logged
/// and left out.
///
/// # Errors
/// Returns [`VerdictError::Decode`] when `value` is not an object or its
/// `errors` entry is not a list of strings.
pub fn verdict_from_value(value: serde_json::Value) -> Result<Verdict, VerdictError> {
    let raw: RawVerdict = serde_json::from_value(value)?;
    let image_extracted = raw
        .image_extracted
        .filter(|extracted| !extracted.is_null())
        .and_then(|extracted| match serde_json::from_value::<ExtractedLabel>(extracted) {
            Ok(extracted) => Some(extracted),
            Err(error) => {
                tracing::warn!("ignoring malformed imageExtracted: {error}");
                None
            }
        });

    Ok(Verdict {
        errors: raw.errors.unwrap_or_default(),
        image_extracted,
    })
}

/// Classifies an HTTP reply into a [`Resolution`].
///
/// - Non-2xx: the body's non-empty `error` string, else `Request failed (<status>)`.
/// - 2xx: [`SUBMITTED_MESSAGE`] with the body's `result` as verdict.
/// - 2xx with a body that is not JSON: [`TRANSPORT_FAILURE_MESSAGE`].
pub fn classify_response(status: u16, body: &[u8]) -> Resolution {
    if !(200..300).contains(&status) {
        let message = serde_json::from_slice::<serde_json::Value>(body)
            .ok()
            .and_then(|value| {
                value
                    .get("error")
                    .and_then(serde_json::Value::as_str)
                    .filter(|error| !error.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| format!("Request failed ({status})"));
        return Resolution::failure(message);
    }

    let response: SubmitResponse = match serde_json::from_slice(body) {
        Ok(response) => response,
        Err(error) => {
            tracing::warn!(status, "success response is not valid JSON: {error}");
            return Resolution::failure(TRANSPORT_FAILURE_MESSAGE);
        }
    };

    let verdict = response
        .result
        .filter(|result| !result.is_null())
        .and_then(|result| match verdict_from_value(result) {
            Ok(verdict) => Some(verdict),
            Err(error) => {
                tracing::warn!("ignoring malformed verdict: {error}");
                None
            }
        });

    Resolution::submitted(verdict)
}

/// Verdict decoding errors.
#[derive(Debug, Error)]
pub enum VerdictError {
    /// JSON decode failure.
    #[error("verdict decode failure: {0}")]
    Decode(#[from] serde_json::Error),
}
