//! Requests the relay sends to a page agent, and their replies.
//!
//! | Action | Reply |
//! |--------|-------|
//! | `extractContent` | [`AgentReply::Snapshot`] |
//! | `highlightAnswer` | [`AgentReply::Highlight`] |
//! | `attachOverlay` | [`AgentReply::Overlay`] |
//! | `attachProbe` | [`AgentReply::Overlay`] |
//! | `removeOverlay` | [`AgentReply::Overlay`] |

// ============================================================================
// Imports
// ============================================================================

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::identifiers::NodeId;

use super::snapshot::PageSnapshot;

// ============================================================================
// AgentRequest
// ============================================================================

/// Operations a page agent performs on its document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum AgentRequest {
    /// Capture a [`PageSnapshot`].
    ExtractContent,

    /// Mark option `option_index` of question `question_index`.
    #[serde(rename_all = "camelCase")]
    HighlightAnswer {
        /// Zero-based question index.
        question_index: usize,
        /// Zero-based option index.
        option_index: usize,
        /// How radio controls are partitioned into questions.
        #[serde(default)]
        grouping: RadioGrouping,
    },

    /// Attach the overlay, or toggle it if already attached.
    AttachOverlay,

    /// Attach the minimal probe proving injection works.
    AttachProbe,

    /// Remove the overlay if present.
    RemoveOverlay,
}

impl AgentRequest {
    /// Returns the wire name of the action.
    #[inline]
    #[must_use]
    pub fn action(&self) -> &'static str {
        match self {
            Self::ExtractContent => "extractContent",
            Self::HighlightAnswer { .. } => "highlightAnswer",
            Self::AttachOverlay => "attachOverlay",
            Self::AttachProbe => "attachProbe",
            Self::RemoveOverlay => "removeOverlay",
        }
    }
}

// ============================================================================
// AgentReply
// ============================================================================

/// Page agent answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AgentReply {
    /// Extracted page.
    Snapshot(PageSnapshot),
    /// Highlight outcome.
    Highlight(HighlightReport),
    /// Overlay state after an attach/toggle/remove.
    Overlay(OverlayState),
}

impl AgentReply {
    /// Unwraps a snapshot reply.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedResponse`] for any other reply.
    pub fn into_snapshot(self) -> Result<PageSnapshot> {
        match self {
            Self::Snapshot(snapshot) => Ok(snapshot),
            other => Err(unexpected("snapshot", &other)),
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
            other => Err(unexpected("highlight report", &other)),
        }
    }

    /// Unwraps an overlay reply.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedResponse`] for any other reply.
    pub fn into_overlay(self) -> Result<OverlayState> {
        match self {
            Self::Overlay(state) => Ok(state),
            other => Err(unexpected("overlay state", &other)),
        }
    }

    fn variant(&self) -> &'static str {
        match self {
            Self::Snapshot(_) => "snapshot",
            Self::Highlight(_) => "highlight report",
            Self::Overlay(_) => "overlay state",
        }
    }
}

fn unexpected(expected: &str, got: &AgentReply) -> Error {
    Error::malformed(format!("expected {expected}, got {}", got.variant()))
}

// ============================================================================
// RadioGrouping
// ============================================================================

/// How the structural tier partitions radio controls into questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", content = "size", rename_all = "camelCase")]
pub enum RadioGrouping {
    /// Consecutive runs of `n` radios, document order.
    Fixed(NonZeroUsize),
    /// Consecutive radios sharing a `name` attribute.
    ByName,
}

impl RadioGrouping {
    /// Options per question assumed when nothing else is known.
    pub const DEFAULT_GROUP_SIZE: NonZeroUsize = NonZeroUsize::new(4).unwrap();

    /// Creates a fixed grouping, returning `None` for zero.
    #[inline]
    #[must_use]
    pub fn fixed(size: usize) -> Option<Self> {
        NonZeroUsize::new(size).map(Self::Fixed)
    }
}

impl Default for RadioGrouping {
    fn default() -> Self {
        Self::Fixed(Self::DEFAULT_GROUP_SIZE)
    }
}

// ============================================================================
// HighlightReport
// ============================================================================

/// Which heuristic located the marked elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HighlightTier {
    /// Grouped radio controls.
    Structural,
    /// Letter-prefix text match.
    Textual,
}

/// Outcome of a highlight request.
///
/// An empty `marked` list is success with no effect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightReport {
    /// Tier that produced the marks, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<HighlightTier>,
    /// Marked elements, document order.
    pub marked: Vec<NodeId>,
}

impl HighlightReport {
    /// Report for a request that matched nothing.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Returns `true` if at least one element was marked.
    #[inline]
    #[must_use]
    pub fn is_found(&self) -> bool {
        !self.marked.is_empty()
    }
}

// ============================================================================
// OverlayState
// ============================================================================

/// State of the page overlay after an injection request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OverlayState {
    /// Freshly attached.
    Attached,
    /// Was hidden, now visible again.
    Shown,
    /// Was visible, now removed.
    Removed,
    /// Nothing to remove.
    Absent,
    /// Probe banner attached.
    Probed,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_format() {
        let request = AgentRequest::HighlightAnswer {
            question_index: 2,
            option_index: 1,
            grouping: RadioGrouping::default(),
        };
        let json = serde_json::to_value(&request).expect("serialize");

        assert_eq!(json["action"], "highlightAnswer");
        assert_eq!(json["questionIndex"], 2);
        assert_eq!(json["optionIndex"], 1);
        assert_eq!(json["grouping"]["strategy"], "fixed");
        assert_eq!(json["grouping"]["size"], 4);
        assert_eq!(request.action(), "highlightAnswer");
    }

    #[test]
    fn test_request_grouping_defaults() {
        let request: AgentRequest = serde_json::from_str(
            r#"{"action":"highlightAnswer","questionIndex":0,"optionIndex":3}"#,
        )
        .expect("parse");
        assert_eq!(
            request,
            AgentRequest::HighlightAnswer {
                question_index: 0,
                option_index: 3,
                grouping: RadioGrouping::default(),
            }
        );
    }

    #[test]
    fn test_grouping_by_name_wire_format() {
        let json = serde_json::to_value(RadioGrouping::ByName).expect("serialize");
        assert_eq!(json["strategy"], "byName");
        assert!(RadioGrouping::fixed(0).is_none());
    }

    #[test]
    fn test_reply_unwrap_mismatch_is_malformed() {
        let reply = AgentReply::Overlay(OverlayState::Attached);
        assert!(matches!(
            reply.into_snapshot(),
            Err(Error::MalformedResponse { .. })
        ));

        let reply = AgentReply::Highlight(HighlightReport::none());
        let report = reply.into_highlight().expect("highlight");
        assert!(!report.is_found());
    }
}
