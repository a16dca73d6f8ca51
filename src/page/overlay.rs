//! Overlay capability attached on activation.
//!
//! The overlay is a fixed-position container hosting the panel frame. A
//! page holds at most one; activating again toggles it instead of adding a
//! second copy.

// ============================================================================
// Imports
// ============================================================================

use tracing::{debug, info};

use crate::protocol::OverlayState;

use super::document::Document;

// ============================================================================
// Constants
// ============================================================================

/// `id` of the overlay container.
pub const OVERLAY_ID: &str = "ai-quiz-solver-overlay";

/// `id` of the fallback probe banner.
pub const PROBE_ID: &str = "ai-quiz-solver-probe";

/// Source of the frame hosting the panel.
pub const PANEL_FRAME_SRC: &str = "panel.html";

/// Text of the probe banner.
pub const PROBE_TEXT: &str = "Extension Working!";

const OVERLAY_STYLE: &str = "position: fixed; top: 20px; right: 20px; width: 420px; \
     height: 600px; z-index: 2147483647; display: block";

const PROBE_STYLE: &str = "position: fixed; top: 10px; right: 10px; background: red; \
     color: white; padding: 10px; z-index: 999999";

// ============================================================================
// Operations
// ============================================================================

/// Attaches the overlay, or toggles an existing one.
///
/// | Before | After | Returns |
/// |--------|-------|---------|
/// | absent | attached, visible | [`OverlayState::Attached`] |
/// | hidden | visible | [`OverlayState::Shown`] |
/// | visible | removed | [`OverlayState::Removed`] |
pub fn toggle_overlay<D: Document + ?Sized>(doc: &mut D) -> OverlayState {
    if let Some(existing) = doc.element_by_id(OVERLAY_ID) {
        if doc.is_hidden(existing) {
            doc.set_hidden(existing, false);
            debug!("Overlay shown");
            return OverlayState::Shown;
        }

        doc.detach(existing);
        debug!("Overlay removed");
        return OverlayState::Removed;
    }

    let container = doc.create_element("div");
    doc.set_attribute(container, "id", OVERLAY_ID);
    doc.set_attribute(container, "style", OVERLAY_STYLE);

    let frame = doc.create_element("iframe");
    doc.set_attribute(frame, "src", PANEL_FRAME_SRC);
    doc.set_attribute(frame, "title", "MCQ panel");
    doc.append_child(container, frame);

    let body = doc.body();
    doc.append_child(body, container);

    info!(url = %doc.url(), "Overlay attached");
    OverlayState::Attached
}

/// Appends the probe banner proving script injection works.
///
/// Idempotent: an existing probe is left in place.
pub fn attach_probe<D: Document + ?Sized>(doc: &mut D) -> OverlayState {
    if doc.element_by_id(PROBE_ID).is_some() {
        return OverlayState::Probed;
    }

    let banner = doc.create_element("div");
    doc.set_attribute(banner, "id", PROBE_ID);
    doc.set_attribute(banner, "style", PROBE_STYLE);
    let text = doc.create_text(PROBE_TEXT);
    doc.append_child(banner, text);

    let body = doc.body();
    doc.append_child(body, banner);

    info!(url = %doc.url(), "Probe attached");
    OverlayState::Probed
}

/// Removes the overlay if present.
pub fn remove_overlay<D: Document + ?Sized>(doc: &mut D) -> OverlayState {
    match doc.element_by_id(OVERLAY_ID) {
        Some(existing) => {
            doc.detach(existing);
            debug!("Overlay removed");
            OverlayState::Removed
        }
        None => OverlayState::Absent,
    }
}

// ============================================================================
// Tests
// ============================================================================
