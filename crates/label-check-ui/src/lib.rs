#![warn(missing_docs)]
//! # label-check-ui
//!
//! ## Purpose
//! Defines the view-facing projections of the label form.
//!
//! ## Responsibilities
//! - Project a submission [`Outcome`] into a success or error banner.
//! - Track drop-zone highlight state across drag events.
//! - Derive the submit control state from the form gate and outcome.
//!
//! ## Data flow
//! Form state changes -> projections in this crate -> rendered by a front end
//! (the CLI prints [`render_banner`] output).
//!
//! ## Error model
//! Pure projections; nothing here fails.

use label_check_verdict::{Outcome, Resolution};

/// Headline of a success banner.
pub const SUCCESS_HEADLINE: &str = "✓ Success";
/// Headline of an error banner.
pub const ERROR_HEADLINE: &str = "✗ Error";
/// Heading above the verdict's inconsistency list.
pub const INCONSISTENCIES_HEADING: &str = "Inconsistencies Detected:";
/// Note shown when the backend found the label consistent.
pub const CONSISTENT_NOTE: &str =
    "The label matches the form data. All required information is consistent!";

/// Banner color/icon family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerTone {
    /// Green check.
    Success,
    /// Red cross.
    Error,
}

/// Status banner shown below the form once a submission resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBanner {
    /// Banner tone.
    pub tone: BannerTone,
    /// Failure message, only present when the call itself failed.
    pub message: Option<String>,
    /// Inconsistencies listed by the verdict.
    pub inconsistencies: Vec<String>,
    /// Consistency note, only present on a clean success.
    pub note: Option<String>,
}

impl StatusBanner {
    /// Builds the banner for one resolution.
    pub fn from_resolution(resolution: &Resolution) -> Self {
        let tone = if resolution.shows_error() {
            BannerTone::Error
        } else {
            BannerTone::Success
        };

        Self {
            tone,
            message: (!resolution.ok).then(|| resolution.message.clone()),
            inconsistencies: resolution.inconsistencies().to_vec(),
            note: (resolution.ok && resolution.inconsistencies().is_empty())
                .then(|| CONSISTENT_NOTE.to_string()),
        }
    }

    /// Banner headline text.
    pub fn headline(&self) -> &'static str {
        match self.tone {
            BannerTone::Success => SUCCESS_HEADLINE,
            BannerTone::Error => ERROR_HEADLINE,
        }
    }
}

/// Returns the banner for a resolved outcome; `None` while idle or in flight.
pub fn project_banner(outcome: &Outcome) -> Option<StatusBanner> {
    outcome.resolution().map(StatusBanner::from_resolution)
}

/// Renders a banner as plain text lines.
pub fn render_banner(banner: &StatusBanner) -> String {
    let mut lines = vec![banner.headline().to_string()];
    if let Some(message) = &banner.message {
        lines.push(message.clone());
    }
    if !banner.inconsistencies.is_empty() {
        lines.push(INCONSISTENCIES_HEADING.to_string());
        lines.extend(banner.inconsistencies.iter().map(|entry| format!("  {entry}")));
    }
    if let Some(note) = &banner.note {
        lines.push(note.clone());
    }
    lines.join("\n")
}

/// State of the submit button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitControl {
    /// Button cannot be pressed.
    pub disabled: bool,
    /// Spinner is shown.
    pub loading: bool,
}

/// Derives submit control state.
pub fn submit_control(can_submit: bool, outcome: &Outcome) -> SubmitControl {
    let loading = outcome.is_in_flight();
    SubmitControl {
        disabled: !can_submit || loading,
        loading,
    }
}

/// Drag events delivered to the image drop zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragEvent {
    /// Pointer entered the zone while dragging.
    Enter,
    /// Pointer moved within the zone while dragging.
    Over,
    /// Pointer left the zone.
    Leave,
    /// Files were dropped.
    Drop,
}

/// Highlight state of the image drop zone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DropZone {
    active: bool,
}

impl DropZone {
    /// Creates an inactive drop zone.
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one drag event.
    pub fn on_drag(&mut self, event: DragEvent) {
        self.active = matches!(event, DragEvent::Enter | DragEvent::Over);
    }

    /// Handles a drop and returns the first dropped item, which the caller
    /// hands to the image pipeline.
    pub fn on_drop<T>(&mut self, items: impl IntoIterator<Item = T>) -> Option<T> {
        self.on_drag(DragEvent::Drop);
        items.into_iter().next()
    }

    /// Returns `true` while a drag hovers over the zone.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Hint shown inside the zone.
    pub fn hint(&self) -> &'static str {
        if self.active {
            "Drop your image here"
        } else {
            "Click to upload or drag and drop"
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for banner projection and drop-zone state.

    use label_check_verdict::Verdict;

    use super::*;

    #[test]
    fn inconsistent_success_renders_as_error_without_message() {
        let outcome = Outcome::Resolved(Resolution::submitted(Some(Verdict {
            errors: vec!["brand mismatch".to_string()],
            image_extracted: None,
        })));

        let banner = project_banner(&outcome).expect("resolved outcome has a banner");
        assert_eq!(banner.tone, BannerTone::Error);
        assert!(banner.message.is_none());
        assert!(banner.note.is_none());
        assert_eq!(
            render_banner(&banner),
            "✗ Error\nInconsistencies Detected:\n  brand mismatch"
        );
    }

    #[test]
    fn drop_zone_tracks_drag_hover() {
        let mut zone = DropZone::new();
        zone.on_drag(DragEvent::Enter);
        zone.on_drag(DragEvent::Over);
        assert!(zone.is_active());
        assert_eq!(zone.hint(), "Drop your image here");

        zone.on_drag(DragEvent::Leave);
        assert!(!zone.is_active());

        zone.on_drag(DragEvent::Enter);
        assert_eq!(zone.on_drop(["a.png", "b.png"]), Some("a.png"));
        assert!(!zone.is_active());
    }
}
