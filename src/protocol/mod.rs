//! Cross-context protocol message types.
//!
//! This module defines what travels between the panel, the relay, the page
//! agent and the detection service. Every value is a copy; nothing here
//! holds a live reference into another context.
//!
//! # Protocol Overview
//!
//! | Message Type | Direction | Purpose |
//! |--------------|-----------|---------|
//! | [`Message`] | Panel → Relay | Typed command |
//! | [`Reply`] | Relay → Panel | Command answer |
//! | [`AgentRequest`] | Relay → Page Agent | DOM operation |
//! | [`AgentReply`] | Page Agent → Relay | DOM operation answer |
//! | [`Envelope`] | any answer | `{success, data \| error}` wrapper |
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `agent` | Page agent requests and replies |
//! | `detection` | Detection service request/result |
//! | `envelope` | Result envelope |
//! | `message` | Panel → relay messages |
//! | `snapshot` | Page snapshot bundle |

// ============================================================================
// Submodules
// ============================================================================

/// Page agent requests and replies.
pub mod agent;

/// Detection service request and result types.
pub mod detection;

/// `{success, data | error}` envelope.
pub mod envelope;

/// Panel to relay messages.
pub mod message;

/// Page snapshot bundle.
pub mod snapshot;

// ============================================================================
// Re-exports
// ============================================================================

pub use agent::{
    AgentReply, AgentRequest, HighlightReport, HighlightTier, OverlayState, RadioGrouping,
};
pub use detection::{
    DetectionRequest, DetectionResult, ModelResponse, ProcessingMode, Question, Rationale,
    option_letter,
};
pub use envelope::Envelope;
pub use message::{Action, Message, Reply};
pub use snapshot::{FormElement, PageLayout, PageSnapshot, TextNode};
