//! Builder for [`Solver`].
//!
//! # Example
//!
//! ```ignore
//! let solver = Solver::builder()
//!     .browser(browser)
//!     .options(SolverOptions::from_env()?)
//!     .build()?;
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use crate::browser::Browser;
use crate::error::{Error, Result};
use crate::service::{DetectionService, HttpDetectionService};

use super::core::Solver;
use super::options::SolverOptions;

// ============================================================================
// SolverBuilder
// ============================================================================

/// Builder for a [`Solver`].
///
/// Use [`Solver::builder()`] to create one.
#[derive(Default)]
pub struct SolverBuilder {
    browser: Option<Arc<dyn Browser>>,
    service: Option<Arc<dyn DetectionService>>,
    options: SolverOptions,
}

impl fmt::Debug for SolverBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolverBuilder")
            .field("has_browser", &self.browser.is_some())
            .field("has_service", &self.service.is_some())
            .field("options", &self.options)
            .finish()
    }
}

impl SolverBuilder {
    /// Creates a builder with default options and no browser.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the browser host. Required.
    #[inline]
    #[must_use]
    pub fn browser(mut self, browser: Arc<dyn Browser>) -> Self {
        self.browser = Some(browser);
        self
    }

    /// Replaces the HTTP detection service.
    #[inline]
    #[must_use]
    pub fn service(mut self, service: Arc<dyn DetectionService>) -> Self {
        self.service = Some(service);
        self
    }

    /// Sets the options.
    #[inline]
    #[must_use]
    pub fn options(mut self, options: SolverOptions) -> Self {
        self.options = options;
        self
    }

    /// Validates the configuration and starts the relay.
    ///
    /// Must be called inside a Tokio runtime.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if no browser was set or the options are invalid
    /// - [`Error::Config`] if the HTTP client cannot be created
    pub fn build(self) -> Result<Solver> {
        let browser = self.browser.ok_or_else(|| {
            Error::config(
                "Browser host is required. Use .browser() to set it.\n\
                 Example: Solver::builder().browser(Arc::new(MemoryBrowser::new()))",
            )
        })?;

        self.options.validate()?;

        let service = match self.service {
            Some(service) => service,
            None => Arc::new(
                HttpDetectionService::new(&self.options.service_url, self.options.http_timeout)?
                    .with_paths(
                        self.options.detect_path.clone(),
                        self.options.multi_detect_path.clone(),
                    )
                    .with_health_path(self.options.health_path.clone()),
            ),
        };

        Solver::start(browser, service, self.options)
    }
}

// ============================================================================
// Tests
// ============================================================================
