//! Page agent: code running with access to a hosted page's DOM.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `document` | [`Document`] adapter trait |
//! | `static_document` | In-memory [`StaticDocument`] |
//! | `extractor` | [`PageSnapshot`](crate::protocol::PageSnapshot) capture |
//! | `highlighter` | Two-tier answer [`Highlighter`] |
//! | `overlay` | Overlay and probe capabilities |
//! | `agent` | [`PageAgent`] request loop |

// ============================================================================
// Submodules
// ============================================================================

/// Page agent task.
pub mod agent;

/// Document adapter trait.
pub mod document;

/// Snapshot extraction.
pub mod extractor;

/// Answer highlighting.
pub mod highlighter;

/// Overlay capability.
pub mod overlay;

/// In-memory document.
pub mod static_document;

// ============================================================================
// Re-exports
// ============================================================================

pub use agent::{AgentHandle, PageAgent, SharedDocument};
pub use document::{Document, NodeRef};
pub use extractor::extract;
pub use highlighter::{HIGHLIGHT_CLASS, Highlighter, STYLE_ID};
pub use overlay::{OVERLAY_ID, PROBE_ID};
pub use static_document::{El, StaticDocument};
