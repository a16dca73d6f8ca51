//! Blocking user notifications.

// ============================================================================
// Imports
// ============================================================================

use parking_lot::Mutex;
use tracing::error;

// ============================================================================
// Notifier Trait
// ============================================================================

/// Surfaces a failure to the user.
pub trait Notifier: Send + Sync {
    /// Shows `message`.
    fn notify(&self, message: &str);
}

// ============================================================================
// LogNotifier
// ============================================================================

/// Writes notifications to the log at `error` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) {
        error!(%message, "User notification");
    }
}

// ============================================================================
// MemoryNotifier
// ============================================================================

/// Records notifications for later inspection.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    messages: Mutex<Vec<String>>,
}

impl MemoryNotifier {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every message so far, oldest first.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, message: &str) {
        self.messages.lock().push(message.to_string());
    }
}
