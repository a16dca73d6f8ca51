//! Presentation surface.
//!
//! | Module | Description |
//! |--------|-------------|
//! | `state` | Main/Results state machine with the in-flight flag |
//! | `controller` | [`Panel`]: detection, highlight, search, close |
//! | `render` | Text views and the fault-free fallback view |
//! | `search` | External search query and URL |
//! | `notifier` | Blocking user notifications |
//!
//! # Example
//!
//! ```ignore
//! let panel = solver.open_panel(Arc::new(LogNotifier));
//!
//! if let DetectionOutcome::Completed { .. } = panel.request_detection(false).await? {
//!     println!("{}", panel.render());
//!     panel.request_highlight(0, 1).await?;
//! }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Panel flow controller.
pub mod controller;

/// User notifications.
pub mod notifier;

/// View rendering.
pub mod render;

/// External search links.
pub mod search;

/// View state machine.
pub mod state;

// ============================================================================
// Re-exports
// ============================================================================

pub use controller::{DetectionOutcome, Panel};
pub use notifier::{LogNotifier, MemoryNotifier, Notifier};
pub use render::{render_fallback, render_main, render_results};
pub use search::{DEFAULT_SEARCH_URL, search_query, search_url};
pub use state::{PanelState, View};
