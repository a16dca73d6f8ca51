//! Activation: attaching the overlay to the page the user invoked us on.
//!
//! Privileged pages are skipped silently. Otherwise the overlay is
//! injected (or toggled, if already present). If injection fails, one
//! fallback attempt injects the probe; if that fails too, the failure is
//! logged and returned.

// ============================================================================
// Imports
// ============================================================================

use tracing::{error, info, warn};
use url::Url;

use crate::browser::{Capability, TabInfo};
use crate::error::{Error, Result};
use crate::identifiers::TabId;
use crate::protocol::OverlayState;

use super::router::Relay;

// ============================================================================
// Constants
// ============================================================================

/// URL schemes of browser- and extension-internal pages.
pub const DENIED_SCHEMES: &[&str] = &[
    "chrome",
    "chrome-extension",
    "moz-extension",
    "edge",
    "about",
    "devtools",
    "view-source",
];

// ============================================================================
// Types
// ============================================================================

/// Why activation did nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The page uses a privileged scheme.
    PrivilegedScheme(String),
    /// The page URL does not parse.
    InvalidUrl,
}

/// Outcome of an activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// Page refused by the deny-list. No injection attempted.
    Skipped(SkipReason),
    /// Overlay attached or toggled.
    Overlay(OverlayState),
    /// Overlay injection failed; the probe succeeded.
    Fallback {
        /// Why the overlay injection failed.
        cause: String,
    },
}

/// Returns why `url` must not be injected into, or `None` if it may.
#[must_use]
pub fn skip_reason(url: &str) -> Option<SkipReason> {
    match Url::parse(url) {
        Ok(parsed) if DENIED_SCHEMES.contains(&parsed.scheme()) => {
            Some(SkipReason::PrivilegedScheme(parsed.scheme().to_string()))
        }
        Ok(_) => None,
        Err(_) => Some(SkipReason::InvalidUrl),
    }
}

// ============================================================================
// Relay Activation
// ============================================================================

impl Relay {
    /// Activates on `tab`.
    ///
    /// # Errors
    ///
    /// - [`Error::TargetUnavailable`] if the tab does not exist
    /// - [`Error::InjectionFailure`] if both the overlay and the probe failed
    pub async fn activate(&self, tab: TabId) -> Result<Activation> {
        let info = self.tab_info(tab).await?;

        if let Some(reason) = skip_reason(&info.url) {
            info!(tab_id = %tab, url = %info.url, ?reason, "Activation skipped");
            return Ok(Activation::Skipped(reason));
        }

        let first = match self.browser.inject(tab, Capability::Overlay).await {
            Ok(state) => {
                info!(tab_id = %tab, ?state, "Overlay activated");
                return Ok(Activation::Overlay(state));
            }
            Err(e) => e,
        };

        warn!(tab_id = %tab, error = %first, "Overlay injection failed, trying probe");

        match self.browser.inject(tab, Capability::Probe).await {
            Ok(_) => {
                info!(tab_id = %tab, "Probe injected");
                Ok(Activation::Fallback {
                    cause: first.to_string(),
                })
            }
            Err(second) => {
                error!(tab_id = %tab, overlay = %first, probe = %second, "All injection methods failed");
                Err(Error::injection_failure(
                    tab,
                    format!("overlay: {first}; probe: {second}"),
                ))
            }
        }
    }

    async fn tab_info(&self, tab: TabId) -> Result<TabInfo> {
        self.browser
            .windows()
            .await?
            .into_iter()
            .flat_map(|window| window.tabs)
            .find(|info| info.id == tab)
            .ok_or_else(|| Error::target_unavailable(format!("tab {tab} does not exist")))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;

    use crate::browser::{Browser, MemoryBrowser, WindowKind};
    use crate::page::{Document, OVERLAY_ID, PROBE_ID, StaticDocument};
    use crate::protocol::{DetectionRequest, DetectionResult, RadioGrouping};
    use crate::service::DetectionService;

    struct NoService;

    #[async_trait]
    impl DetectionService for NoService {
        async fn detect(&self, _request: &DetectionRequest) -> Result<DetectionResult> {
            Err(Error::network("unused"))
        }

        async fn health(&self) -> Result<()> {
            Ok(())
        }
    }

    fn setup(url: &str) -> (Arc<MemoryBrowser>, Relay, TabId) {
        let browser = Arc::new(MemoryBrowser::new());
        let window = browser.open_window(WindowKind::Normal);
        let tab = browser
            .open_page(window, StaticDocument::new(url, "Page"))
            .expect("open");
        let relay = Relay::new(
            Arc::clone(&browser) as Arc<dyn Browser>,
            Arc::new(NoService),
            RadioGrouping::default(),
        );
        (browser, relay, tab)
    }

    #[test]
    fn test_skip_reason() {
        assert_eq!(
            skip_reason("chrome-extension://abcdef/panel.html"),
            Some(SkipReason::PrivilegedScheme("chrome-extension".into()))
        );
        assert!(skip_reason("chrome://settings").is_some());
        assert!(skip_reason("moz-extension://x/y").is_some());
        assert_eq!(skip_reason("not a url"), Some(SkipReason::InvalidUrl));
        assert_eq!(skip_reason("https://example.com/quiz"), None);
        assert_eq!(skip_reason("file:///tmp/quiz.html"), None);
    }

    #[tokio::test]
    async fn test_privileged_page_is_not_injected() {
        let (browser, relay, tab) = setup("chrome-extension://abcdef/options.html");

        let outcome = relay.activate(tab).await.expect("no error");

        assert!(matches!(
            outcome,
            Activation::Skipped(SkipReason::PrivilegedScheme(_))
        ));
        let doc = browser.document(tab).expect("document");
        assert_eq!(doc.lock().elements().len(), 3);
    }

    #[tokio::test]
    async fn test_activation_toggles() {
        let (_, relay, tab) = setup("https://example.com/quiz");

        assert_eq!(
            relay.activate(tab).await.expect("activate"),
            Activation::Overlay(OverlayState::Attached)
        );
        assert_eq!(
            relay.activate(tab).await.expect("activate"),
            Activation::Overlay(OverlayState::Removed)
        );
    }

    #[tokio::test]
    async fn test_fallback_to_probe() {
        let (browser, relay, tab) = setup("https://example.com/quiz");
        browser.block_injection(tab, Capability::Overlay);

        let outcome = relay.activate(tab).await.expect("activate");
        assert!(matches!(outcome, Activation::Fallback { .. }));

        let doc = browser.document(tab).expect("document");
        let doc = doc.lock();
        assert!(doc.element_by_id(PROBE_ID).is_some());
        assert!(doc.element_by_id(OVERLAY_ID).is_none());
    }

    #[tokio::test]
    async fn test_both_injections_fail() {
        let (browser, relay, tab) = setup("https://example.com/quiz");
        browser.block_injection(tab, Capability::Overlay);
        browser.block_injection(tab, Capability::Probe);

        let err = relay.activate(tab).await.unwrap_err();
        assert!(matches!(err, Error::InjectionFailure { .. }));
    }

    #[tokio::test]
    async fn test_unknown_tab() {
        let (_, relay, _) = setup("https://example.com/quiz");
        let missing = TabId::new(42).expect("tab id");
        assert!(matches!(
            relay.activate(missing).await,
            Err(Error::TargetUnavailable { .. })
        ));
    }
}
