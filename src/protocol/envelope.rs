//! Result envelope crossing context boundaries.
//!
//! Every handler answers with exactly one envelope.
//!
//! # Format
//!
//! Success:
//! ```json
//! { "success": true, "data": { ... } }
//! ```
//!
//! Failure:
//! ```json
//! { "success": false, "error": "Target unavailable: no active tab", "kind": "targetUnavailable" }
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorKind, Result};

// ============================================================================
// Envelope
// ============================================================================

/// `{success, data | error}` wrapper for a cross-context answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Whether the handler succeeded.
    pub success: bool,

    /// Payload (if success).
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    /// Error message (if failure).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Error category (if failure).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
}

impl<T> Envelope<T> {
    /// Creates a success envelope.
    #[inline]
    #[must_use]
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            kind: None,
        }
    }

    /// Creates a failure envelope from an error.
    #[inline]
    #[must_use]
    pub fn err(error: &Error) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.to_string()),
            kind: Some(error.kind()),
        }
    }

    /// Returns `true` if this is a success envelope.
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Unwraps the envelope into a result.
    ///
    /// # Errors
    ///
    /// - [`Error::Remote`] carrying the sender's message if `success` is false
    /// - [`Error::MalformedResponse`] if `success` is true but `data` is absent
    pub fn into_result(self) -> Result<T> {
        if self.success {
            return self
                .data
                .ok_or_else(|| Error::malformed("success envelope without data"));
        }

        let message = self.error.unwrap_or_else(|| "unknown error".to_string());
        Err(Error::remote(self.kind.unwrap_or(ErrorKind::Internal), message))
    }
}

impl<T> From<Result<T>> for Envelope<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(error) => Self::err(&error),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
