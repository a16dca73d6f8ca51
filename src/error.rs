//! Error types for the MCQ overlay.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use mcq_overlay::{Result, Error};
//!
//! async fn example(panel: &Panel) -> Result<()> {
//!     panel.request_detection(false).await?;
//!     panel.request_highlight(0, 1).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Target | [`Error::TargetUnavailable`], [`Error::InjectionFailure`] |
//! | Service | [`Error::NetworkFailure`], [`Error::MalformedResponse`] |
//! | Page | [`Error::HighlightNotFound`] |
//! | Configuration | [`Error::Config`], [`Error::InvalidArgument`] |
//! | Transport | [`Error::Timeout`], [`Error::ChannelClosed`] |
//! | Panel | [`Error::Render`] |
//! | Boundary | [`Error::Remote`] |
//! | External | [`Error::Json`] |
//!
//! # Crossing Contexts
//!
//! Errors never cross a context boundary as values. The sender flattens
//! them into an [`Envelope`](crate::protocol::Envelope) carrying the
//! message and an [`ErrorKind`]; the receiver rebuilds an
//! [`Error::Remote`] from the pair.

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::oneshot::error::RecvError;

use crate::identifiers::TabId;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Target Errors
    // ========================================================================
    /// No eligible page to act on.
    ///
    /// Returned when no normal window has an active tab, or the tab
    /// disappeared between resolution and dispatch.
    #[error("Target unavailable: {message}")]
    TargetUnavailable {
        /// Why no target could be used.
        message: String,
    },

    /// Capability attach failed, fallback included.
    #[error("Injection failed on tab {tab_id}: {message}")]
    InjectionFailure {
        /// Tab the injection targeted.
        tab_id: TabId,
        /// Description of the last failure.
        message: String,
    },

    // ========================================================================
    // Service Errors
    // ========================================================================
    /// Detection service unreachable or answered with a non-2xx status.
    #[error("Network failure{}: {message}", status_suffix(.status))]
    NetworkFailure {
        /// HTTP status when the service answered.
        status: Option<u16>,
        /// Description of the failure.
        message: String,
    },

    /// Response missing its expected shape.
    #[error("Malformed response: {message}")]
    MalformedResponse {
        /// What was wrong with the response.
        message: String,
    },

    // ========================================================================
    // Page Errors
    // ========================================================================
    /// Neither highlight tier found a candidate.
    ///
    /// Non-fatal; never shown to the user.
    #[error("No highlight target for question {question_index}, option {option_index}")]
    HighlightNotFound {
        /// Zero-based question index.
        question_index: usize,
        /// Zero-based option index.
        option_index: usize,
    },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// Invalid argument in a message.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument.
        message: String,
    },

    // ========================================================================
    // Transport Errors
    // ========================================================================
    /// Cross-context call timeout.
    #[error("Timeout after {timeout_ms}ms: {operation}")]
    Timeout {
        /// Description of the operation that timed out.
        operation: String,
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    /// The receiving context went away before answering.
    #[error("Channel closed")]
    ChannelClosed,

    // ========================================================================
    // Panel Errors
    // ========================================================================
    /// Fault while rendering a panel view.
    #[error("Render error: {message}")]
    Render {
        /// Description of the fault.
        message: String,
    },

    // ========================================================================
    // Boundary Errors
    // ========================================================================
    /// Error reported by another context through an envelope.
    #[error("{message}")]
    Remote {
        /// Category of the original error.
        kind: ErrorKind,
        /// Display text of the original error.
        message: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// ErrorKind
// ============================================================================

/// Error category carried across context boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    /// See [`Error::TargetUnavailable`].
    TargetUnavailable,
    /// See [`Error::InjectionFailure`].
    InjectionFailure,
    /// See [`Error::NetworkFailure`].
    NetworkFailure,
    /// See [`Error::MalformedResponse`].
    MalformedResponse,
    /// See [`Error::HighlightNotFound`].
    HighlightNotFound,
    /// See [`Error::InvalidArgument`].
    InvalidArgument,
    /// See [`Error::Timeout`] and [`Error::ChannelClosed`].
    Transport,
    /// Anything else.
    Internal,
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

impl From<RecvError> for Error {
    fn from(_: RecvError) -> Self {
        Self::ChannelClosed
    }
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a target unavailable error.
    #[inline]
    pub fn target_unavailable(message: impl Into<String>) -> Self {
        Self::TargetUnavailable {
            message: message.into(),
        }
    }

    /// Creates an injection failure error.
    #[inline]
    pub fn injection_failure(tab_id: TabId, message: impl Into<String>) -> Self {
        Self::InjectionFailure {
            tab_id,
            message: message.into(),
        }
    }

    /// Creates a network failure error without HTTP status.
    #[inline]
    pub fn network(message: impl Into<String>) -> Self {
        Self::NetworkFailure {
            status: None,
            message: message.into(),
        }
    }

    /// Creates a network failure error for a non-2xx HTTP status.
    #[inline]
    pub fn http_status(status: u16, message: impl Into<String>) -> Self {
        Self::NetworkFailure {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Creates a malformed response error.
    #[inline]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    /// Creates a highlight not found error.
    #[inline]
    pub fn highlight_not_found(question_index: usize, option_index: usize) -> Self {
        Self::HighlightNotFound {
            question_index,
            option_index,
        }
    }

    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an invalid argument error.
    #[inline]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a timeout error.
    #[inline]
    pub fn timeout(operation: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout_ms,
        }
    }

    /// Creates a render error.
    #[inline]
    pub fn render(message: impl Into<String>) -> Self {
        Self::Render {
            message: message.into(),
        }
    }

    /// Rebuilds an error received from another context.
    #[inline]
    pub fn remote(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::Remote {
            kind,
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Classification
// ============================================================================

impl Error {
    /// Returns the category used when this error crosses a boundary.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::TargetUnavailable { .. } => ErrorKind::TargetUnavailable,
            Self::InjectionFailure { .. } => ErrorKind::InjectionFailure,
            Self::NetworkFailure { .. } => ErrorKind::NetworkFailure,
            Self::MalformedResponse { .. } | Self::Json(_) => ErrorKind::MalformedResponse,
            Self::HighlightNotFound { .. } => ErrorKind::HighlightNotFound,
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::Timeout { .. } | Self::ChannelClosed => ErrorKind::Transport,
            Self::Config { .. } | Self::Render { .. } => ErrorKind::Internal,
            Self::Remote { kind, .. } => *kind,
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if the panel must surface this error as a blocking
    /// notification.
    ///
    /// [`Error::HighlightNotFound`] is log-only.
    #[inline]
    #[must_use]
    pub fn is_user_visible(&self) -> bool {
        self.kind() != ErrorKind::HighlightNotFound
    }

    /// Returns `true` if this error came from talking to the detection service.
    #[inline]
    #[must_use]
    pub fn is_network_error(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::NetworkFailure | ErrorKind::MalformedResponse
        )
    }

    /// Returns `true` if this error came from the cross-context transport.
    #[inline]
    #[must_use]
    pub fn is_transport_error(&self) -> bool {
        self.kind() == ErrorKind::Transport
    }
}

// ============================================================================
// Tests
// ============================================================================
