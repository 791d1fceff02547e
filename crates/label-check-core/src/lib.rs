#![warn(missing_docs)]
//! # label-check-core
//!
//! ## Purpose
//! Defines the form data model used across the `label-check` workspace.
//!
//! ## Responsibilities
//! - Hold the five label form fields and apply per-keystroke filtering.
//! - Normalize alcohol content and net contents for transmission.
//! - Assemble the JSON submission payload and fingerprint it for logs.
//!
//! ## Data flow
//! Front end edits -> [`FieldStore::set`] / [`FieldStore::set_unit`] ->
//! snapshot [`FormFields`] -> [`SubmissionPayload::assemble`] -> transport.
//!
//! ## Ownership and lifetimes
//! [`FieldStore`] exclusively owns its [`FormFields`]. Reset replaces the record
//! instead of mutating it, and snapshots handed to async stages are clones.
//!
//! ## Error model
//! Parsing unit or field names from external text fails with [`CoreError`].
//! Rejected keystrokes are not errors: [`FieldStore::set`] returns `false`.
//!
//! ## Example
//! ```rust
//! use label_check_core::{FieldStore, TextField};
//!
//! let mut store = FieldStore::new();
//! assert!(store.set(TextField::AlcoholContent, "40%"));
//! assert!(!store.set(TextField::AlcoholContent, "40%%"));
//! assert_eq!(store.fields().alcohol_content, "40%");
//! ```

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Net contents units offered by the form, in picker order.
pub const VOLUME_UNITS: [VolumeUnit; 3] = [
    VolumeUnit::Milliliters,
    VolumeUnit::Liters,
    VolumeUnit::Ounces,
];

/// Unit attached to the net contents value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum VolumeUnit {
    /// Milliliters (`mL`).
    #[default]
    Milliliters,
    /// Liters (`L`).
    Liters,
    /// Fluid ounces (`oz`).
    Ounces,
}

impl VolumeUnit {
    /// Returns the label text used in the form and in the payload.
    pub fn as_str(&self) -> &'static str {
        match self {
            VolumeUnit::Milliliters => "mL",
            VolumeUnit::Liters => "L",
            VolumeUnit::Ounces => "oz",
        }
    }
}

impl fmt::Display for VolumeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VolumeUnit {
    type Err = CoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        VOLUME_UNITS
            .into_iter()
            .find(|unit| unit.as_str() == raw)
            .ok_or_else(|| CoreError::UnknownUnit(raw.to_string()))
    }
}

/// Free-text fields of the label form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextField {
    /// Brand name as printed on the label.
    BrandName,
    /// Product class or type (for example `Vodka`).
    ProductClass,
    /// Alcohol content, filtered to digits, `.` and one `%`.
    AlcoholContent,
    /// Numeric net contents value without its unit.
    NetContents,
}

impl TextField {
    /// Returns the wire name of the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            TextField::BrandName => "brandName",
            TextField::ProductClass => "productClass",
            TextField::AlcoholContent => "alcoholContent",
            TextField::NetContents => "netContents",
        }
    }
}

/// Complete form record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    /// Brand name.
    pub brand_name: String,
    /// Product class/type.
    pub product_class: String,
    /// Alcohol content as typed.
    pub alcohol_content: String,
    /// Net contents numeric text.
    pub net_contents: String,
    /// Selected net contents unit.
    pub net_contents_unit: VolumeUnit,
}

impl FormFields {
    /// Returns the current value of one text field.
    pub fn get(&self, field: TextField) -> &str {
        match field {
            TextField::BrandName => &self.brand_name,
            TextField::ProductClass => &self.product_class,
            TextField::AlcoholContent => &self.alcohol_content,
            TextField::NetContents => &self.net_contents,
        }
    }

    /// Returns `true` when every text field is non-blank.
    pub fn is_complete(&self) -> bool {
        [
            TextField::BrandName,
            TextField::ProductClass,
            TextField::AlcoholContent,
            TextField::NetContents,
        ]
        .into_iter()
        .all(|field| !self.get(field).trim().is_empty())
    }
}

/// Owner of the form record with keystroke-level filtering.
#[derive(Debug, Clone, Default)]
pub struct FieldStore {
    fields: FormFields,
}

impl FieldStore {
    /// Creates a store holding the default record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current record.
    pub fn fields(&self) -> &FormFields {
        &self.fields
    }

    /// Applies one edit.
    ///
    /// # Returns
    /// `false` when the edit was filtered out and the prior value kept. Only
    /// [`TextField::AlcoholContent`] is filtered, see [`alcohol_content_accepts`].
    pub fn set(&mut self, field: TextField, raw: impl Into<String>) -> bool {
        let raw = raw.into();
        if field == TextField::AlcoholContent && !alcohol_content_accepts(&raw) {
            tracing::debug!(field = field.as_str(), "edit rejected by field filter");
            return false;
        }

        let slot = match field {
            TextField::BrandName => &mut self.fields.brand_name,
            TextField::ProductClass => &mut self.fields.product_class,
            TextField::AlcoholContent => &mut self.fields.alcohol_content,
            TextField::NetContents => &mut self.fields.net_contents,
        };
        *slot = raw;
        true
    }

    /// Selects the net contents unit.
    pub fn set_unit(&mut self, unit: VolumeUnit) {
        self.fields.net_contents_unit = unit;
    }

    /// Replaces the record with a fresh default record.
    pub fn reset(&mut self) {
        self.fields = FormFields::default();
    }

    /// Returns `true` when every text field is non-blank.
    pub fn is_complete(&self) -> bool {
        self.fields.is_complete()
    }
}

/// Keystroke filter for alcohol content.
///
/// Accepts the empty string, or text made only of ASCII digits, `.` and `%`
/// holding at most one `%`.
pub fn alcohol_content_accepts(raw: &str) -> bool {
    if raw.is_empty() {
        return true;
    }

    let allowed = raw
        .chars()
        .all(|c| c.is_ascii_digit() || c == '.' || c == '%');
    allowed && raw.matches('%').count() <= 1
}

/// Trims alcohol content and appends `%` when a non-empty value lacks one.
pub fn normalize_alcohol_content(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.contains('%') {
        return trimmed.to_string();
    }

    format!("{trimmed}%")
}

/// Formats net contents as `"<value> <unit>"`.
pub fn format_net_contents(value: &str, unit: VolumeUnit) -> String {
    format!("{} {}", value.trim(), unit)
}

/// JSON body posted to the verification endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    /// Brand name exactly as stored.
    pub brand_name: String,
    /// Product class exactly as stored.
    pub product_class: String,
    /// Normalized alcohol content (`%` appended when absent).
    pub alcohol_content: String,
    /// Net contents with unit, for example `750 mL`.
    pub net_contents: String,
    /// Label image as a data URI.
    pub label_image: Option<String>,
}

impl SubmissionPayload {
    /// Builds the outbound payload from a field snapshot and encoded image.
    pub fn assemble(fields: &FormFields, label_image: Option<String>) -> Self {
        Self {
            brand_name: fields.brand_name.clone(),
            product_class: fields.product_class.clone(),
            alcohol_content: normalize_alcohol_content(&fields.alcohol_content),
            net_contents: format_net_contents(&fields.net_contents, fields.net_contents_unit),
            label_image,
        }
    }

    /// Serializes payload to compact JSON bytes.
    ///
    /// # Errors
    /// Returns [`CoreError::Codec`] when JSON serialization fails.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, CoreError> {
        serde_json::to_vec(self).map_err(CoreError::Codec)
    }
}

/// Stable SHA-256 hex digest of a payload, used to correlate log lines
/// without writing image bytes.
pub fn submission_fingerprint(payload: &SubmissionPayload) -> String {
    let mut hasher = Sha256::new();
    for part in [
        payload.brand_name.as_str(),
        payload.product_class.as_str(),
        payload.alcohol_content.as_str(),
        payload.net_contents.as_str(),
        payload.label_image.as_deref().unwrap_or_default(),
    ] {
        hasher.update((part.len() as u64).to_be_bytes());
        hasher.update(part.as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// Error type for form model parsing and codec failures.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Unit text is not one of `mL`, `L`, `oz`.
    #[error("unknown volume unit: {0}")]
    UnknownUnit(String),
    /// JSON serialization failure.
    #[error("codec failure: {0}")]
    Codec(#[from] serde_json::Error),
}
