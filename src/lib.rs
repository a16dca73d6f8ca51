//! MCQ Overlay - detect and answer multiple-choice questions on a web page.
//!
//! The library models a browser extension as three isolated contexts that
//! only talk through typed request/response channels:
//!
//! - **Panel**: the user-facing surface (main and results views)
//! - **Relay**: a stateless router owning the exhaustive dispatch table
//! - **Page Agent**: code with access to one page's document
//!
//! The relay forwards page snapshots to an external HTTP detection service
//! and hands the structured answers back to the panel, which can then ask
//! the page agent to highlight the correct option.
//!
//! Key design principles:
//!
//! - Every cross-context call answers exactly once, with an [`Envelope`]
//! - Messages are a closed enum; routing is one exhaustive `match`
//! - The page is reached only through the [`Document`](page::Document) trait
//! - One attempt per network call, no retries
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use mcq_overlay::browser::{MemoryBrowser, WindowKind};
//! use mcq_overlay::page::{El, StaticDocument};
//! use mcq_overlay::panel::{DetectionOutcome, LogNotifier};
//! use mcq_overlay::{Result, Solver, SolverOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let browser = Arc::new(MemoryBrowser::new());
//!     let window = browser.open_window(WindowKind::Normal);
//!     let tab = browser.open_page(
//!         window,
//!         StaticDocument::new("https://example.com/quiz", "Quiz").with_body([
//!             El::new("p").text("1) What is 2+2?"),
//!             El::new("li").text("A) 3"),
//!             El::new("li").text("B) 4"),
//!         ]),
//!     )?;
//!
//!     let solver = Solver::builder()
//!         .browser(browser)
//!         .options(SolverOptions::from_env()?)
//!         .build()?;
//!
//!     solver.activate(tab).await?;
//!
//!     let panel = solver.open_panel(Arc::new(LogNotifier));
//!     if let DetectionOutcome::Completed { .. } = panel.request_detection(false).await? {
//!         println!("{}", panel.render());
//!         panel.request_highlight(0, 1).await?;
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`solver`] | Entry point: [`Solver`], [`SolverBuilder`], [`SolverOptions`] |
//! | [`panel`] | Presentation surface: [`Panel`](panel::Panel) |
//! | [`relay`] | Message router and activation |
//! | [`page`] | Page agent: extractor, highlighter, overlay |
//! | [`browser`] | Host abstraction and in-memory host |
//! | [`service`] | External detection service client |
//! | [`protocol`] | Messages, replies, envelopes, detection types |
//! | [`transport`] | Typed request/response channels |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |

// ============================================================================
// Modules
// ============================================================================

/// Host browser abstraction.
///
/// - [`Browser`](browser::Browser) - windows, tabs, injection, tab creation
/// - [`MemoryBrowser`](browser::MemoryBrowser) - in-process host
pub mod browser;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers.
///
/// Newtype wrappers prevent mixing incompatible IDs at compile time.
pub mod identifiers;

/// Page agent: document adapter, extractor, highlighter, overlay.
pub mod page;

/// Presentation surface.
pub mod panel;

/// Cross-context message types.
pub mod protocol;

/// Message router.
pub mod relay;

/// External detection service client.
pub mod service;

/// Solver factory and configuration.
///
/// Use [`Solver::builder()`] to create a configured instance.
pub mod solver;

/// Typed request/response channels between contexts.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Solver types
pub use solver::{Solver, SolverBuilder, SolverOptions};

// Error types
pub use error::{Error, ErrorKind, Result};

// Identifier types
pub use identifiers::{NodeId, PanelId, RequestId, TabId, WindowId};

// Protocol types
pub use protocol::{DetectionRequest, DetectionResult, Envelope, Message, Question, Reply};
