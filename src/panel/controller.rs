//! Panel flow controller.
//!
//! A [`Panel`] drives one presentation surface: it resolves the target
//! page, talks to the relay, moves its [`PanelState`] between views and
//! turns failures into user notifications.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::browser::{Browser, TabInfo, active_target};
use crate::error::{Error, Result};
use crate::identifiers::{PanelId, TabId};
use crate::protocol::{DetectionRequest, HighlightReport, Message, OverlayState, Question};
use crate::relay::RelayHandle;

use super::notifier::Notifier;
use super::render::{render_fallback, render_view};
use super::search::search_url;
use super::state::PanelState;

// ============================================================================
// DetectionOutcome
// ============================================================================

/// What a detect command ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionOutcome {
    /// Results are showing.
    Completed {
        /// Number of detected questions.
        questions: usize,
    },
    /// Nothing was sent: a detection was pending, results were showing,
    /// or the panel is closed.
    Skipped,
    /// The panel closed while the request was pending; the answer was dropped.
    Discarded,
}

// ============================================================================
// InFlight
// ============================================================================

/// Releases the in-flight slot on every exit path.
struct InFlight<'a>(&'a Mutex<PanelState>);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.lock().end_detection();
    }
}

// ============================================================================
// Panel
// ============================================================================

/// One presentation surface.
pub struct Panel {
    id: PanelId,
    relay: RelayHandle,
    browser: Arc<dyn Browser>,
    notifier: Arc<dyn Notifier>,
    search_base: Url,
    state: Mutex<PanelState>,
}

impl fmt::Debug for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Panel")
            .field("id", &self.id)
            .field("state", &*self.state.lock())
            .finish_non_exhaustive()
    }
}

impl Panel {
    /// Creates a panel on the main view.
    #[must_use]
    pub fn new(
        relay: RelayHandle,
        browser: Arc<dyn Browser>,
        notifier: Arc<dyn Notifier>,
        search_base: Url,
    ) -> Self {
        let id = PanelId::generate();
        debug!(panel_id = %id, "Panel opened");
        Self {
            id,
            relay,
            browser,
            notifier,
            search_base,
            state: Mutex::new(PanelState::new()),
        }
    }

    /// Returns this panel's ID.
    #[inline]
    #[must_use]
    pub fn id(&self) -> PanelId {
        self.id
    }

    /// Returns a copy of the current state.
    #[must_use]
    pub fn state(&self) -> PanelState {
        self.state.lock().clone()
    }

    /// Selects single or multi mode for the next detection.
    pub fn set_multi_model(&self, multi_model: bool) {
        self.state.lock().set_multi_model(multi_model);
    }

    // ========================================================================
    // Detection
    // ========================================================================

    /// Extracts the active page and sends it for detection.
    ///
    /// `use_multi_model` picks the endpoint and becomes the selected mode.
    /// Re-entry while a detection is pending is a no-op.
    ///
    /// # Errors
    ///
    /// - [`Error::TargetUnavailable`] if no page can be targeted
    /// - network, malformed-response and agent failures from the relay
    ///
    /// User-visible failures are also passed to the notifier.
    pub async fn request_detection(&self, use_multi_model: bool) -> Result<DetectionOutcome> {
        {
            let mut state = self.state.lock();
            if !state.begin_detection() {
                debug!(panel_id = %self.id, "Detection skipped");
                return Ok(DetectionOutcome::Skipped);
            }
            state.set_multi_model(use_multi_model);
        }
        let _in_flight = InFlight(&self.state);

        match self.detect(use_multi_model).await {
            Ok(outcome) => Ok(outcome),
            Err(e) if self.state.lock().is_closed() => {
                debug!(panel_id = %self.id, error = %e, "Panel closed, detection error discarded");
                Ok(DetectionOutcome::Discarded)
            }
            Err(e) => {
                self.surface("Error detecting MCQs", &e);
                Err(e)
            }
        }
    }

    async fn detect(&self, use_multi_model: bool) -> Result<DetectionOutcome> {
        let target = self.resolve_target().await?;
        info!(panel_id = %self.id, tab_id = %target.id, use_multi_model, "Detecting MCQs");

        let snapshot = self
            .relay
            .call(Message::ExtractContent { tab_id: target.id })
            .await?
            .into_snapshot()?;

        let request = DetectionRequest {
            content: snapshot.content,
            layout: snapshot.layout,
            url: target.url,
            use_multi_model,
        };

        let result = self
            .relay
            .call(Message::DetectMcqs(request))
            .await?
            .into_detection()?;

        let questions = result.questions.len();
        let mut state = self.state.lock();
        if state.is_closed() {
            debug!(panel_id = %self.id, "Panel closed, detection result discarded");
            return Ok(DetectionOutcome::Discarded);
        }
        state.show_results(result);
        info!(panel_id = %self.id, questions, "Detection completed");
        Ok(DetectionOutcome::Completed { questions })
    }

    // ========================================================================
    // Highlight
    // ========================================================================

    /// Highlights option `option_index` of question `question_index` on the
    /// page that is active now.
    ///
    /// Finding nothing is not an error; the report is simply empty.
    ///
    /// # Errors
    ///
    /// [`Error::TargetUnavailable`] or relay failures. These are also
    /// passed to the notifier.
    pub async fn request_highlight(
        &self,
        question_index: usize,
        option_index: usize,
    ) -> Result<HighlightReport> {
        let result = async {
            let target = self.resolve_target().await?;
            self.relay
                .call(Message::HighlightAnswer {
                    tab_id: target.id,
                    question_index,
                    option_index,
                })
                .await?
                .into_highlight()
        }
        .await;

        match result {
            Ok(report) => {
                if !report.is_found() {
                    info!(panel_id = %self.id, question_index, option_index, "No option highlighted");
                }
                Ok(report)
            }
            Err(e) => {
                self.surface("Error highlighting answer", &e);
                Err(e)
            }
        }
    }

    // ========================================================================
    // External Search
    // ========================================================================

    /// Opens a web search for `question` in a new tab.
    ///
    /// # Errors
    ///
    /// Whatever the host fails with when opening the tab.
    pub async fn request_external_search(&self, question: &Question) -> Result<TabId> {
        let url = search_url(&self.search_base, question);
        debug!(panel_id = %self.id, %url, "Opening search");
        self.browser.open_tab(url.as_str()).await
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Results → Main. Returns `false` if already on the main view.
    pub fn back(&self) -> bool {
        self.state.lock().back()
    }

    /// Closes the panel and removes the overlay from the active page.
    ///
    /// The panel is closed even if the overlay cannot be removed.
    ///
    /// # Errors
    ///
    /// [`Error::TargetUnavailable`] or relay failures.
    pub async fn close(&self) -> Result<OverlayState> {
        self.state.lock().close();
        info!(panel_id = %self.id, "Panel closed");

        let target = self.resolve_target().await?;
        self.relay
            .call(Message::CloseWindow { tab_id: target.id })
            .await?
            .into_closed()
    }

    /// Reload action of the fallback view: back to a fresh main view.
    pub fn reload(&self) {
        self.state.lock().reset();
        debug!(panel_id = %self.id, "Panel reloaded");
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// Renders the current view, or the fallback view on a fault.
    ///
    /// A render fault sticks until [`reload`](Self::reload).
    #[must_use]
    pub fn render(&self) -> String {
        let mut state = self.state.lock();
        if let Some(fault) = state.fault() {
            return render_fallback(fault);
        }

        match render_view(&state) {
            Ok(page) => page,
            Err(e) => {
                error!(panel_id = %self.id, error = %e, "Render failed");
                let message = e.to_string();
                let page = render_fallback(&message);
                state.set_fault(message);
                page
            }
        }
    }

    // ========================================================================
    // Internal
    // ========================================================================

    async fn resolve_target(&self) -> Result<TabInfo> {
        let windows = self.browser.windows().await?;
        active_target(&windows)
    }

    fn surface(&self, context: &str, error: &Error) {
        if error.is_user_visible() {
            warn!(panel_id = %self.id, error = %error, "{context}");
            self.notifier.notify(&format!("{context}: {error}"));
        } else {
            debug!(panel_id = %self.id, error = %error, "{context}");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
