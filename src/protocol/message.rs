//! Messages the panel sends to the relay.
//!
//! The action set is closed: a new action is a new [`Message`] variant, and
//! every `match` over messages must handle it.
//!
//! | Action | Fields | Reply |
//! |--------|--------|-------|
//! | `detectMCQs` | `content`, `layout`, `url`, `useMultiModel` | [`Reply::Detection`] |
//! | `extractContent` | `tabId` | [`Reply::Snapshot`] |
//! | `highlightAnswer` | `tabId`, `questionIndex`, `optionIndex` | [`Reply::Highlight`] |
//! | `closeWindow` | `tabId` | [`Reply::Closed`] |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::identifiers::TabId;

use super::agent::{HighlightReport, OverlayState};
use super::detection::{DetectionRequest, DetectionResult};
use super::snapshot::PageSnapshot;

// ============================================================================
// Message
// ============================================================================

/// A typed request from the panel to the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum Message {
    /// Forward a snapshot to the detection service.
    #[serde(rename = "detectMCQs")]
    DetectMcqs(DetectionRequest),

    /// Capture a snapshot of a tab.
    #[serde(rename = "extractContent", rename_all = "camelCase")]
    ExtractContent {
        /// Target tab.
        tab_id: TabId,
    },

    /// Mark an answer option on a tab.
    #[serde(rename = "highlightAnswer", rename_all = "camelCase")]
    HighlightAnswer {
        /// Target tab.
        tab_id: TabId,
        /// Zero-based question index.
        question_index: usize,
        /// Zero-based option index.
        option_index: usize,
    },

    /// Dismiss the overlay on a tab.
    #[serde(rename = "closeWindow", rename_all = "camelCase")]
    CloseWindow {
        /// Target tab.
        tab_id: TabId,
    },
}

impl Message {
    /// Returns the action discriminator.
    #[inline]
    #[must_use]
    pub fn action(&self) -> Action {
        match self {
            Self::DetectMcqs(_) => Action::DetectMcqs,
            Self::ExtractContent { .. } => Action::ExtractContent,
            Self::HighlightAnswer { .. } => Action::HighlightAnswer,
            Self::CloseWindow { .. } => Action::CloseWindow,
        }
    }

    /// Returns the tab the message targets, if any.
    #[inline]
    #[must_use]
    pub fn tab_id(&self) -> Option<TabId> {
        match self {
            Self::DetectMcqs(_) => None,
            Self::ExtractContent { tab_id }
            | Self::HighlightAnswer { tab_id, .. }
            | Self::CloseWindow { tab_id } => Some(*tab_id),
        }
    }
}

// ============================================================================
// Action
// ============================================================================

/// Message discriminator, for logging and metrics fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// `detectMCQs`
    DetectMcqs,
    /// `extractContent`
    ExtractContent,
    /// `highlightAnswer`
    HighlightAnswer,
    /// `closeWindow`
    CloseWindow,
}

impl Action {
    /// Wire name of the action.
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::DetectMcqs => "detectMCQs",
            Self::ExtractContent => "extractContent",
            Self::HighlightAnswer => "highlightAnswer",
            Self::CloseWindow => "closeWindow",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Reply
// ============================================================================

/// Relay answers, one per [`Message`] variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reply {
    /// Answer to `detectMCQs`.
    Detection(DetectionResult),
    /// Answer to `extractContent`.
    Snapshot(PageSnapshot),
    /// Answer to `highlightAnswer`.
    Highlight(HighlightReport),
    /// Answer to `closeWindow`.
    Closed(OverlayState),
}

impl Reply {
    /// Unwraps a detection reply.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedResponse`] for any other reply.
    pub fn into_detection(self) -> Result<DetectionResult> {
        match self {
            Self::Detection(result) => Ok(result),
            other => Err(other.mismatch(Action::DetectMcqs)),
        }
    }

    /// Unwraps a snapshot reply.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedResponse`] for any other reply.
    pub fn into_snapshot(self) -> Result<PageSnapshot> {
        match self {
            Self::Snapshot(snapshot) => Ok(snapshot),
            other => Err(other.mismatch(Action::ExtractContent)),
        }
    }

    /// Unwraps a highlight reply.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedResponse`] for any other reply.
    pub fn into_highlight(self) -> Result<HighlightReport> {
        match self {
            Self::Highlight(report) => Ok(report),
            other => Err(other.mismatch(Action::HighlightAnswer)),
        }
    }

    /// Unwraps a close reply.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedResponse`] for any other reply.
    pub fn into_closed(self) -> Result<OverlayState> {
        match self {
            Self::Closed(state) => Ok(state),
            other => Err(other.mismatch(Action::CloseWindow)),
        }
    }

    fn answers(&self) -> Action {
        match self {
            Self::Detection(_) => Action::DetectMcqs,
            Self::Snapshot(_) => Action::ExtractContent,
            Self::Highlight(_) => Action::HighlightAnswer,
            Self::Closed(_) => Action::CloseWindow,
        }
    }

    fn mismatch(&self, expected: Action) -> Error {
        Error::malformed(format!(
            "expected reply to {expected}, got reply to {}",
            self.answers()
        ))
    }
}

// ============================================================================
// Tests
// ============================================================================
