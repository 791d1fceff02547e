#![warn(missing_docs)]
//! # label-check-app
//!
//! ## Purpose
//! Orchestrates the field store, image pipeline, and submission for one label
//! form, and hosts the runtime plumbing (configuration, logging) for the CLI.
//!
//! ## Responsibilities
//! - Gate submission on a complete form with an attached image.
//! - Drive the `Idle -> InFlight -> Resolved` outcome state machine.
//! - Reject overlapping submissions and drop completions made stale by reset.
//! - Load configuration from the environment and initialize `tracing`.
//!
//! ## Data flow
//! Edits -> [`LabelForm`] -> [`LabelForm::begin_submit`] -> [`PendingSubmission::run`]
//! (image export, payload assembly, one POST, classification) ->
//! [`LabelForm::finish_submit`] -> [`project_form_status`].
//!
//! ## Ownership and lifetimes
//! [`PendingSubmission`] owns a snapshot of the fields and the image export, so
//! the form can keep taking edits (or a reset) while the request is in flight.
//!
//! ## Error model
//! Submission never fails: every problem resolves into an [`Outcome`].
//! Configuration and CLI input problems are reported as [`AppError`].
//!
//! ## Security and privacy notes
//! Image bytes never reach the log; data URIs are passed through
//! [`redact_data_uris`] and payloads are referenced by fingerprint.

use std::time::Duration;

use label_check_capture::{
    ExportRequest, ImageCapture, LabelFile, PreviewReady, PreviewRequest, PreviewState,
};
use label_check_core::{FieldStore, FormFields, SubmissionPayload, TextField, VolumeUnit};
use label_check_submit::{
    DEFAULT_TIMEOUT, SubmitEndpoint, SubmitTransport, TransportError, submit_payload,
};
use label_check_ui::{StatusBanner, SubmitControl, project_banner, submit_control};
use label_check_verdict::{
    IMAGE_READ_FAILURE_MESSAGE, INCOMPLETE_FORM_MESSAGE, Outcome, Resolution,
};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable holding the verification backend base URL.
pub const ENV_API_URL: &str = "LABEL_CHECK_API_URL";
/// Environment variable holding the request timeout in seconds.
pub const ENV_TIMEOUT_SECS: &str = "LABEL_CHECK_TIMEOUT_SECS";

/// Returns the app version.
pub fn app_version() -> &'static str {
    APP_VERSION
}

/// Default `tracing` filter when `RUST_LOG` is unset.
///
/// `label_check` prefixes every workspace crate target.
pub fn default_log_filter() -> &'static str {
    "warn,label_check=info"
}

/// Installs the global `tracing` subscriber. Later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Backend base URL, without the `/api/submit-label` suffix.
    pub api_url: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl AppConfig {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    /// See [`AppConfig::from_lookup`].
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`.
    ///
    /// Blank values count as unset.
    ///
    /// # Errors
    /// Returns [`AppError::Config`] when the timeout is not a positive integer.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let non_blank = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let timeout = match non_blank(ENV_TIMEOUT_SECS) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(AppError::Config(format!(
                        "{ENV_TIMEOUT_SECS} must be a positive number of seconds, got {raw:?}"
                    )));
                }
            },
            None => DEFAULT_TIMEOUT,
        };

        Ok(Self {
            api_url: non_blank(ENV_API_URL).map(|value| value.trim().to_string()),
            timeout,
        })
    }

    /// Overrides the base URL when `api_url` is present.
    pub fn with_api_url(mut self, api_url: Option<String>) -> Self {
        if api_url.is_some() {
            self.api_url = api_url;
        }
        self
    }

    /// Resolves the submission endpoint.
    ///
    /// # Errors
    /// Returns [`AppError::MissingApiUrl`] when no base URL is configured, or
    /// [`AppError::Transport`] when it is not a usable URL.
    pub fn endpoint(&self) -> Result<SubmitEndpoint, AppError> {
        let base = self.api_url.as_deref().ok_or(AppError::MissingApiUrl)?;
        Ok(SubmitEndpoint::from_base(base)?)
    }
}

/// Replaces the base64 payload of every data URI with its length.
pub fn redact_data_uris(input: &str) -> String {
    const MARKER: &str = ";base64,";

    let mut redacted = String::with_capacity(input.len().min(512));
    let mut rest = input;
    while let Some(position) = rest.find(MARKER) {
        let (head, tail) = rest.split_at(position + MARKER.len());
        redacted.push_str(head);
        let len = tail
            .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '=')))
            .unwrap_or(tail.len());
        redacted.push_str(&format!("<{len} bytes redacted>"));
        rest = &tail[len..];
    }
    redacted.push_str(rest);
    redacted
}

/// Why [`LabelForm::begin_submit`] did not start a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitRejected {
    /// A request is already in flight.
    #[error("a submission is already in flight")]
    AlreadyInFlight,
    /// Fields are missing or no image is attached.
    #[error("form is incomplete")]
    Incomplete,
}

/// Submission started by [`LabelForm::begin_submit`].
#[derive(Debug)]
#[must_use = "a pending submission does nothing until run"]
pub struct PendingSubmission {
    sequence: u64,
    fields: FormFields,
    export: ExportRequest,
}

impl PendingSubmission {
    /// Submission sequence number.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Exports the image, assembles the payload, sends it once, and classifies
    /// the reply.
    pub async fn run<T: SubmitTransport>(
        self,
        transport: &T,
        endpoint: &SubmitEndpoint,
    ) -> CompletedSubmission {
        let resolution = match self.export.resolve().await {
            Some(label_image) => {
                let payload = SubmissionPayload::assemble(&self.fields, Some(label_image));
                tracing::debug!(
                    sequence = self.sequence,
                    payload = %redact_data_uris(&format!("{payload:?}")),
                    "payload assembled"
                );
                submit_payload(transport, endpoint, &payload).await
            }
            None => Resolution::failure(IMAGE_READ_FAILURE_MESSAGE),
        };

        CompletedSubmission {
            sequence: self.sequence,
            resolution,
        }
    }
}

/// Finished submission, applied by [`LabelForm::finish_submit`].
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedSubmission {
    sequence: u64,
    resolution: Resolution,
}

impl CompletedSubmission {
    /// Submission sequence number.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Classified result.
    pub fn resolution(&self) -> &Resolution {
        &self.resolution
    }
}

/// One label form: fields, image, and submission outcome.
#[derive(Debug, Clone, Default)]
pub struct LabelForm {
    fields: FieldStore,
    image: ImageCapture,
    outcome: Outcome,
    submission_sequence: u64,
}

impl LabelForm {
    /// Creates an empty form.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current field values.
    pub fn fields(&self) -> &FormFields {
        self.fields.fields()
    }

    /// Applies one field edit; `false` when the edit was filtered out.
    pub fn set_field(&mut self, field: TextField, raw: impl Into<String>) -> bool {
        self.fields.set(field, raw)
    }

    /// Selects the net contents unit.
    pub fn set_unit(&mut self, unit: VolumeUnit) {
        self.fields.set_unit(unit);
    }

    /// Image pipeline state.
    pub fn image(&self) -> &ImageCapture {
        &self.image
    }

    /// Offers a picked or dropped file; see [`ImageCapture::accept`].
    pub fn accept_image(&mut self, file: Option<LabelFile>) -> Option<PreviewRequest> {
        self.image.accept(file)
    }

    /// Publishes a preview; see [`ImageCapture::apply_preview`].
    pub fn apply_preview(&mut self, ready: PreviewReady) -> bool {
        self.image.apply_preview(ready)
    }

    /// Accepts a file and waits for its preview; `false` when rejected.
    pub async fn attach_image(&mut self, file: Option<LabelFile>) -> bool {
        self.image.accept_and_preview(file).await
    }

    /// Removes the attached image.
    pub fn clear_image(&mut self) {
        self.image.clear();
    }

    /// Current submission outcome.
    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    /// Returns `true` when all text fields are filled and an image is held.
    pub fn can_submit(&self) -> bool {
        self.fields.is_complete() && self.image.has_file()
    }

    /// Starts a submission.
    ///
    /// # Errors
    /// - [`SubmitRejected::AlreadyInFlight`] while a request is pending; the
    ///   outcome is untouched.
    /// - [`SubmitRejected::Incomplete`] when [`LabelForm::can_submit`] is false;
    ///   the outcome becomes a failed resolution and nothing is sent.
    pub fn begin_submit(&mut self) -> Result<PendingSubmission, SubmitRejected> {
        if self.outcome.is_in_flight() {
            return Err(SubmitRejected::AlreadyInFlight);
        }

        if !self.can_submit() {
            self.outcome = Outcome::Resolved(Resolution::failure(INCOMPLETE_FORM_MESSAGE));
            return Err(SubmitRejected::Incomplete);
        }

        self.submission_sequence += 1;
        self.outcome = Outcome::InFlight;
        tracing::debug!(sequence = self.submission_sequence, "submission started");

        Ok(PendingSubmission {
            sequence: self.submission_sequence,
            fields: self.fields.fields().clone(),
            export: self.image.export_request(),
        })
    }

    /// Stores a finished submission's result.
    ///
    /// # Returns
    /// `false` when the completion is stale (the form was reset meanwhile).
    pub fn finish_submit(&mut self, completed: CompletedSubmission) -> bool {
        if completed.sequence != self.submission_sequence || !self.outcome.is_in_flight() {
            tracing::debug!(
                stale = completed.sequence,
                current = self.submission_sequence,
                "discarding stale submission result"
            );
            return false;
        }

        self.outcome = Outcome::Resolved(completed.resolution);
        true
    }

    /// Runs a whole submission and returns the resulting outcome.
    pub async fn submit<T: SubmitTransport>(
        &mut self,
        transport: &T,
        endpoint: &SubmitEndpoint,
    ) -> &Outcome {
        match self.begin_submit() {
            Ok(pending) => {
                let completed = pending.run(transport, endpoint).await;
                self.finish_submit(completed);
            }
            Err(rejected) => tracing::debug!("submit rejected: {rejected}"),
        }
        &self.outcome
    }

    /// Clears fields, image, and outcome.
    pub fn reset(&mut self) {
        self.fields.reset();
        self.image.clear();
        self.outcome = Outcome::Idle;
        // Invalidates any submission still in flight.
        self.submission_sequence += 1;
    }
}

/// Flat projection of the form for a front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormStatus {
    /// Submission gate.
    pub can_submit: bool,
    /// Submit button state.
    pub submit: SubmitControl,
    /// Image slot: `none`, `loading`, `ready`, or `unavailable`.
    pub image: &'static str,
    /// Banner for a resolved outcome.
    pub banner: Option<StatusBanner>,
}

/// Projects the form into a [`FormStatus`].
pub fn project_form_status(form: &LabelForm) -> FormStatus {
    let can_submit = form.can_submit();
    let image = match form.image().preview() {
        None => "none",
        Some(PreviewState::Loading) => "loading",
        Some(PreviewState::Ready(_)) => "ready",
        Some(PreviewState::Unavailable) => "unavailable",
    };

    FormStatus {
        can_submit,
        submit: submit_control(can_submit, form.outcome()),
        image,
        banner: project_banner(form.outcome()),
    }
}

/// App integration error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid configuration value.
    #[error("configuration error: {0}")]
    Config(String),
    /// No backend base URL configured.
    #[error("no backend configured: set {ENV_API_URL} or pass --api-url")]
    MissingApiUrl,
    /// Transport setup failure.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    /// A field value was filtered out.
    #[error("{field} rejected value {value:?}")]
    RejectedField {
        /// Field wire name.
        field: &'static str,
        /// Offered value.
        value: String,
    },
    /// The offered file is not an image.
    #[error("{name} is not an image (media type {media_type})")]
    RejectedImage {
        /// File name.
        name: String,
        /// Declared media type.
        media_type: String,
    },
    /// Result could not be written as JSON.
    #[error("output encoding failed: {0}")]
    Output(#[from] serde_json::Error),
}
