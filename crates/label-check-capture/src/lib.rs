#![warn(missing_docs)]
//! # label-check-capture
//!
//! ## Purpose
//! Owns the label image attached to the form and its data URI encodings.
//!
//! ## Responsibilities
//! - Accept image files from a picker or a drop, rejecting non-image media types.
//! - Derive a displayable preview asynchronously.
//! - Export a fresh transfer-ready data URI on demand.
//! - Discard stale reads so an older completion never clobbers newer state.
//!
//! ## Data flow
//! Front end hands a [`LabelFile`] to [`ImageCapture::accept`] -> the returned
//! [`PreviewRequest`] is awaited -> [`ImageCapture::apply_preview`] publishes
//! the preview. On submit, [`ImageCapture::export_request`] is resolved into the
//! payload's `labelImage`.
//!
//! ## Ownership and lifetimes
//! Requests own a cheap clone of the file, never a borrow of the pipeline, so the
//! pipeline stays mutable while reads are pending. Ordering is enforced by a
//! per-instance sequence number.
//!
//! ## Error model
//! Read failures surface as [`CaptureError`] from [`read_data_uri`] and are
//! folded into absent values by the pipeline, with a warning log line.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;

/// Where the bytes of a [`LabelFile`] come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    /// Bytes already in memory.
    Memory(Arc<[u8]>),
    /// File on disk, read at encode time.
    Path(PathBuf),
}

/// One user-supplied file with its declared media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelFile {
    /// Display name of the file.
    pub name: String,
    /// Declared media type, for example `image/png`.
    pub media_type: String,
    /// Backing bytes.
    pub source: FileSource,
}

impl LabelFile {
    /// Creates a file backed by in-memory bytes.
    pub fn from_bytes(
        name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            source: FileSource::Memory(bytes.into()),
        }
    }

    /// Creates a file backed by a path, guessing the media type from its
    /// extension. Unknown extensions map to `application/octet-stream`.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let media_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Self {
            name,
            media_type,
            source: FileSource::Path(path.to_path_buf()),
        }
    }

    /// Returns `true` when the declared media type is an image type.
    pub fn is_image(&self) -> bool {
        self.media_type.starts_with("image/")
    }

    async fn read_bytes(&self) -> Result<Arc<[u8]>, CaptureError> {
        match &self.source {
            FileSource::Memory(bytes) => Ok(Arc::clone(bytes)),
            FileSource::Path(path) => tokio::fs::read(path)
                .await
                .map(Arc::from)
                .map_err(|source| CaptureError::Read {
                    name: self.name.clone(),
                    source,
                }),
        }
    }
}

/// Encodes bytes as a `data:<media type>;base64,<payload>` URI.
pub fn encode_data_uri(media_type: &str, bytes: &[u8]) -> String {
    format!("data:{media_type};base64,{}", STANDARD.encode(bytes))
}

/// Reads the whole file and encodes it as a data URI.
///
/// # Errors
/// Returns [`CaptureError::Read`] when the backing file cannot be read.
pub async fn read_data_uri(file: &LabelFile) -> Result<String, CaptureError> {
    let bytes = file.read_bytes().await?;
    Ok(encode_data_uri(&file.media_type, &bytes))
}

/// Observable state of the preview for the held file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewState {
    /// Read is pending.
    Loading,
    /// Preview data URI is available.
    Ready(String),
    /// Read failed; the file is still held.
    Unavailable,
}

/// Pending preview read returned by [`ImageCapture::accept`].
#[derive(Debug, Clone)]
#[must_use = "the preview is only published once loaded and applied"]
pub struct PreviewRequest {
    sequence: u64,
    file: LabelFile,
}

impl PreviewRequest {
    /// Sequence number this request belongs to.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Reads the file into a data URI. Never fails: a read error yields an
    /// absent URI.
    pub async fn load(self) -> PreviewReady {
        let data_uri = match read_data_uri(&self.file).await {
            Ok(uri) => Some(uri),
            Err(error) => {
                tracing::warn!(file = %self.file.name, "preview read failed: {error}");
                None
            }
        };

        PreviewReady {
            sequence: self.sequence,
            data_uri,
        }
    }
}

/// Completed preview read, applied through [`ImageCapture::apply_preview`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewReady {
    sequence: u64,
    data_uri: Option<String>,
}

impl PreviewReady {
    /// Sequence number of the originating request.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Encoded preview, absent when the read failed.
    pub fn data_uri(&self) -> Option<&str> {
        self.data_uri.as_deref()
    }
}

/// On-demand export of the held file, detached from the pipeline.
#[derive(Debug, Clone, Default)]
pub struct ExportRequest {
    file: Option<LabelFile>,
}

impl ExportRequest {
    /// Returns `true` when a file was held at request time.
    pub fn has_file(&self) -> bool {
        self.file.is_some()
    }

    /// Reads the file freshly into a data URI.
    ///
    /// Resolves to `None` when no file was held or the read failed.
    pub async fn resolve(self) -> Option<String> {
        let file = self.file?;
        match read_data_uri(&file).await {
            Ok(uri) => Some(uri),
            Err(error) => {
                tracing::warn!(file = %file.name, "image export failed: {error}");
                None
            }
        }
    }
}

#[derive(Debug, Clone)]
struct HeldImage {
    file: LabelFile,
    preview: PreviewState,
}

/// Image capture pipeline for one form instance.
#[derive(Debug, Clone, Default)]
pub struct ImageCapture {
    held: Option<HeldImage>,
    sequence: u64,
}

impl ImageCapture {
    /// Creates an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Offers a file to the pipeline.
    ///
    /// # Returns
    /// `None` when `file` is absent or not an image; the pipeline is unchanged.
    /// Otherwise the file becomes current, its preview is [`PreviewState::Loading`],
    /// and the returned request must be loaded and applied to publish it.
    pub fn accept(&mut self, file: Option<LabelFile>) -> Option<PreviewRequest> {
        let file = file?;
        if !file.is_image() {
            tracing::debug!(
                file = %file.name,
                media_type = %file.media_type,
                "ignoring non-image file"
            );
            return None;
        }

        self.sequence += 1;
        tracing::debug!(file = %file.name, sequence = self.sequence, "image accepted");
        self.held = Some(HeldImage {
            file: file.clone(),
            preview: PreviewState::Loading,
        });

        Some(PreviewRequest {
            sequence: self.sequence,
            file,
        })
    }

    /// Publishes a completed preview read.
    ///
    /// # Returns
    /// `false` when the read is stale (a newer accept or a clear happened since).
    pub fn apply_preview(&mut self, ready: PreviewReady) -> bool {
        if ready.sequence != self.sequence {
            tracing::debug!(
                stale = ready.sequence,
                current = self.sequence,
                "discarding stale preview"
            );
            return false;
        }

        let Some(held) = self.held.as_mut() else {
            return false;
        };
        held.preview = match ready.data_uri {
            Some(uri) => PreviewState::Ready(uri),
            None => PreviewState::Unavailable,
        };
        true
    }

    /// Accepts a file and awaits its preview in one step.
    ///
    /// # Returns
    /// `false` when the file was rejected.
    pub async fn accept_and_preview(&mut self, file: Option<LabelFile>) -> bool {
        let Some(request) = self.accept(file) else {
            return false;
        };
        let ready = request.load().await;
        self.apply_preview(ready);
        true
    }

    /// Drops the held file and its preview.
    pub fn clear(&mut self) {
        self.sequence += 1;
        self.held = None;
    }

    /// Returns the held file.
    pub fn file(&self) -> Option<&LabelFile> {
        self.held.as_ref().map(|held| &held.file)
    }

    /// Returns `true` when a file is held.
    pub fn has_file(&self) -> bool {
        self.held.is_some()
    }

    /// Returns the preview state, `None` when no file is held.
    pub fn preview(&self) -> Option<&PreviewState> {
        self.held.as_ref().map(|held| &held.preview)
    }

    /// Returns the preview data URI once ready.
    pub fn preview_uri(&self) -> Option<&str> {
        match self.preview() {
            Some(PreviewState::Ready(uri)) => Some(uri),
            _ => None,
        }
    }

    /// Current sequence number.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Snapshots the held file for a detached export.
    pub fn export_request(&self) -> ExportRequest {
        ExportRequest {
            file: self.file().cloned(),
        }
    }

    /// Exports the held file as a fresh data URI, `None` when no file is held
    /// or the read fails.
    pub async fn export_encoded(&self) -> Option<String> {
        self.export_request().resolve().await
    }
}

/// Capture layer error type.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// Backing file could not be read.
    #[error("failed to read {name}: {source}")]
    Read {
        /// File display name.
        name: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}
