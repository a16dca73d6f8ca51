//! Relay: the process-wide router.
//!
//! | Module | Description |
//! |--------|-------------|
//! | `router` | [`Relay`] task and exhaustive message dispatch |
//! | `activation` | Deny-list check and overlay injection with one fallback |

// ============================================================================
// Submodules
// ============================================================================

/// Activation and injection fallback.
pub mod activation;

/// Message router.
pub mod router;

// ============================================================================
// Re-exports
// ============================================================================

pub use activation::{Activation, DENIED_SCHEMES, SkipReason, skip_reason};
pub use router::{Relay, RelayHandle};
