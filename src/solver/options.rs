//! Solver configuration.
//!
//! # Example
//!
//! ```ignore
//! use mcq_overlay::SolverOptions;
//!
//! let options = SolverOptions::new()
//!     .with_service_url("https://solver.internal:8443")
//!     .with_grouping(RadioGrouping::ByName);
//! options.validate()?;
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};
use crate::panel::DEFAULT_SEARCH_URL;
use crate::protocol::RadioGrouping;
use crate::service::{
    DEFAULT_HTTP_TIMEOUT, DEFAULT_SERVICE_URL, DETECT_PATH, HEALTH_PATH, MULTI_DETECT_PATH,
};

// ============================================================================
// Constants
// ============================================================================

/// Overrides [`SolverOptions::service_url`].
pub const ENV_SERVICE_URL: &str = "MCQ_SERVICE_URL";

/// Overrides [`SolverOptions::grouping`]: a group size, or `by-name`.
pub const ENV_RADIO_GROUP_SIZE: &str = "MCQ_RADIO_GROUP_SIZE";

// ============================================================================
// SolverOptions
// ============================================================================

/// Everything a [`Solver`](super::Solver) needs besides the browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverOptions {
    /// Detection service base URL.
    pub service_url: String,

    /// Single-model detection path.
    pub detect_path: String,

    /// Multi-model detection path.
    pub multi_detect_path: String,

    /// Health check path.
    pub health_path: String,

    /// Timeout of one detection HTTP call.
    pub http_timeout: Duration,

    /// Timeout of one panel-to-relay call. `None` waits for the answer.
    pub relay_timeout: Option<Duration>,

    /// Radio partitioning used by the structural highlight tier.
    pub grouping: RadioGrouping,

    /// Base URL of external searches.
    pub search_url: String,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl SolverOptions {
    /// Creates options pointing at a local detection service.
    #[must_use]
    pub fn new() -> Self {
        Self {
            service_url: DEFAULT_SERVICE_URL.to_string(),
            detect_path: DETECT_PATH.to_string(),
            multi_detect_path: MULTI_DETECT_PATH.to_string(),
            health_path: HEALTH_PATH.to_string(),
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            relay_timeout: None,
            grouping: RadioGrouping::default(),
            search_url: DEFAULT_SEARCH_URL.to_string(),
        }
    }

    /// Creates default options overridden by `MCQ_SERVICE_URL` and
    /// `MCQ_RADIO_GROUP_SIZE`.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if a variable holds an unusable value.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut options = Self::new();

        if let Some(url) = lookup(ENV_SERVICE_URL) {
            options.service_url = url;
        }

        if let Some(raw) = lookup(ENV_RADIO_GROUP_SIZE) {
            options.grouping = parse_grouping(raw.trim())?;
        }

        options.validate()?;
        Ok(options)
    }
}

fn parse_grouping(raw: &str) -> Result<RadioGrouping> {
    if raw.eq_ignore_ascii_case("by-name") {
        return Ok(RadioGrouping::ByName);
    }

    raw.parse::<usize>()
        .ok()
        .and_then(RadioGrouping::fixed)
        .ok_or_else(|| {
            Error::config(format!(
                "{ENV_RADIO_GROUP_SIZE} must be a positive integer or \"by-name\", got {raw:?}"
            ))
        })
}

// ============================================================================
// Builder Methods
// ============================================================================

impl SolverOptions {
    /// Sets the detection service base URL.
    #[inline]
    #[must_use]
    pub fn with_service_url(mut self, url: impl Into<String>) -> Self {
        self.service_url = url.into();
        self
    }

    /// Sets the single and multi detection paths.
    #[inline]
    #[must_use]
    pub fn with_paths(mut self, single: impl Into<String>, multi: impl Into<String>) -> Self {
        self.detect_path = single.into();
        self.multi_detect_path = multi.into();
        self
    }

    /// Sets the health check path.
    #[inline]
    #[must_use]
    pub fn with_health_path(mut self, path: impl Into<String>) -> Self {
        self.health_path = path.into();
        self
    }

    /// Sets the HTTP timeout.
    #[inline]
    #[must_use]
    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    /// Bounds every panel-to-relay call.
    #[inline]
    #[must_use]
    pub fn with_relay_timeout(mut self, timeout: Duration) -> Self {
        self.relay_timeout = Some(timeout);
        self
    }

    /// Sets the radio grouping.
    #[inline]
    #[must_use]
    pub fn with_grouping(mut self, grouping: RadioGrouping) -> Self {
        self.grouping = grouping;
        self
    }

    /// Sets the external search base URL.
    #[inline]
    #[must_use]
    pub fn with_search_url(mut self, url: impl Into<String>) -> Self {
        self.search_url = url.into();
        self
    }
}

// ============================================================================
// Validation
// ============================================================================

impl SolverOptions {
    /// Checks the options before anything is started.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] for a non-http(s) URL, a path without a leading
    /// `/`, or a zero timeout.
    pub fn validate(&self) -> Result<()> {
        http_url("service_url", &self.service_url)?;
        self.search_base()?;

        for (name, path) in [
            ("detect_path", &self.detect_path),
            ("multi_detect_path", &self.multi_detect_path),
            ("health_path", &self.health_path),
        ] {
            if !path.starts_with('/') {
                return Err(Error::config(format!(
                    "{name} must start with '/', got {path:?}"
                )));
            }
        }

        if self.http_timeout.is_zero() {
            return Err(Error::config("http_timeout must be non-zero"));
        }
        if self.relay_timeout.is_some_and(|t| t.is_zero()) {
            return Err(Error::config("relay_timeout must be non-zero"));
        }

        Ok(())
    }

    /// Parsed [`search_url`](Self::search_url).
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if it is not an http(s) URL.
    pub fn search_base(&self) -> Result<Url> {
        http_url("search_url", &self.search_url)
    }
}

fn http_url(name: &str, raw: &str) -> Result<Url> {
    let url = Url::parse(raw)
        .map_err(|e| Error::config(format!("{name} {raw:?} is not a valid URL: {e}")))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(Error::config(format!(
            "{name} must use http or https, got {other}"
        ))),
    }
}

// ============================================================================
// Tests
// ============================================================================
