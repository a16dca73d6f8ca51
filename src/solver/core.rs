//! Solver: the entry point that wires the three contexts together.
//!
//! A [`Solver`] owns the running relay. Activations go straight to it;
//! each [`Panel`] it opens talks to it through its own handle.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use mcq_overlay::browser::{MemoryBrowser, WindowKind};
//! use mcq_overlay::page::{El, StaticDocument};
//! use mcq_overlay::panel::LogNotifier;
//! use mcq_overlay::{Result, Solver};
//!
//! # async fn example() -> Result<()> {
//! let browser = Arc::new(MemoryBrowser::new());
//! let window = browser.open_window(WindowKind::Normal);
//! let tab = browser.open_page(
//!     window,
//!     StaticDocument::new("https://example.com/quiz", "Quiz")
//!         .with_body([El::new("p").text("1) What is 2+2? A) 3 B) 4")]),
//! )?;
//!
//! let solver = Solver::builder().browser(browser).build()?;
//! solver.activate(tab).await?;
//!
//! let panel = solver.open_panel(Arc::new(LogNotifier));
//! panel.request_detection(false).await?;
//! println!("{}", panel.render());
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use tracing::info;
use url::Url;

use crate::browser::Browser;
use crate::error::Result;
use crate::identifiers::TabId;
use crate::panel::{Notifier, Panel};
use crate::relay::{Activation, Relay, RelayHandle};
use crate::service::DetectionService;

use super::builder::SolverBuilder;
use super::options::SolverOptions;

// ============================================================================
// Types
// ============================================================================

struct SolverInner {
    relay: Arc<Relay>,
    handle: RelayHandle,
    browser: Arc<dyn Browser>,
    service: Arc<dyn DetectionService>,
    search_base: Url,
    options: SolverOptions,
}

// ============================================================================
// Solver
// ============================================================================

/// Running system: relay task plus the factory for panels.
///
/// Cloning is cheap and shares the same relay.
#[derive(Clone)]
pub struct Solver {
    inner: Arc<SolverInner>,
}

impl fmt::Debug for Solver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Solver")
            .field("service_url", &self.inner.options.service_url)
            .field("pending_calls", &self.inner.handle.pending_count())
            .finish_non_exhaustive()
    }
}

impl Solver {
    /// Creates a configuration builder.
    #[inline]
    #[must_use]
    pub fn builder() -> SolverBuilder {
        SolverBuilder::new()
    }

    pub(super) fn start(
        browser: Arc<dyn Browser>,
        service: Arc<dyn DetectionService>,
        options: SolverOptions,
    ) -> Result<Self> {
        let search_base = options.search_base()?;
        let relay = Arc::new(Relay::new(
            Arc::clone(&browser),
            Arc::clone(&service),
            options.grouping,
        ));
        let handle = Arc::clone(&relay).spawn(options.relay_timeout);

        info!(
            service_url = %options.service_url,
            grouping = ?options.grouping,
            "Solver started"
        );

        Ok(Self {
            inner: Arc::new(SolverInner {
                relay,
                handle,
                browser,
                service,
                search_base,
                options,
            }),
        })
    }

    /// Returns the options the solver was built with.
    #[inline]
    #[must_use]
    pub fn options(&self) -> &SolverOptions {
        &self.inner.options
    }

    /// Returns a new handle to the relay.
    #[inline]
    #[must_use]
    pub fn relay_handle(&self) -> RelayHandle {
        self.inner.handle.clone()
    }

    /// User invoked the extension on `tab`.
    ///
    /// # Errors
    ///
    /// See [`Relay::activate`].
    pub async fn activate(&self, tab: TabId) -> Result<Activation> {
        self.inner.relay.activate(tab).await
    }

    /// Opens a new panel on the main view.
    #[must_use]
    pub fn open_panel(&self, notifier: Arc<dyn Notifier>) -> Panel {
        Panel::new(
            self.relay_handle(),
            Arc::clone(&self.inner.browser),
            notifier,
            self.inner.search_base.clone(),
        )
    }

    /// Checks that the detection service is up.
    ///
    /// # Errors
    ///
    /// [`Error::NetworkFailure`](crate::Error::NetworkFailure) or
    /// [`Error::MalformedResponse`](crate::Error::MalformedResponse).
    pub async fn health(&self) -> Result<()> {
        self.inner.service.health().await
    }
}

// ============================================================================
// Tests
// ============================================================================
