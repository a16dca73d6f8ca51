//! Host browser module.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Browser`] | Host operations: windows, agents, injection, new tabs |
//! | [`MemoryBrowser`] | In-memory host backed by [`StaticDocument`](crate::page::StaticDocument)s |
//! | [`WindowInfo`] / [`TabInfo`] | Window and tab snapshots |
//!
//! # Example
//!
//! ```no_run
//! use mcq_overlay::browser::{Browser, MemoryBrowser, WindowKind, active_target};
//! use mcq_overlay::page::StaticDocument;
//!
//! # async fn example() -> mcq_overlay::Result<()> {
//! let browser = MemoryBrowser::new();
//! let window = browser.open_window(WindowKind::Normal);
//! browser.open_page(window, StaticDocument::new("https://example.com/quiz", "Quiz"))?;
//!
//! let target = active_target(&browser.windows().await?)?;
//! assert_eq!(target.url, "https://example.com/quiz");
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Browser trait and target resolution.
pub mod host;

/// In-memory browser.
pub mod memory;

// ============================================================================
// Re-exports
// ============================================================================

pub use host::{Browser, Capability, TabInfo, WindowInfo, WindowKind, active_target};
pub use memory::MemoryBrowser;
