//! Page agent task.
//!
//! Owns one tab's document and serves [`AgentRequest`]s from the relay, one
//! at a time, in arrival order. It is the only writer of its document.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::error::Result;
use crate::identifiers::TabId;
use crate::protocol::{AgentReply, AgentRequest};
use crate::transport::{Endpoint, channel};

use super::document::Document;
use super::extractor;
use super::highlighter::Highlighter;
use super::overlay;

// ============================================================================
// Types
// ============================================================================

/// Relay-side handle to a running page agent.
pub type AgentHandle = Endpoint<AgentRequest, AgentReply>;

/// Shared document slot. The agent writes; hosts may read.
pub type SharedDocument<D> = Arc<Mutex<D>>;

// ============================================================================
// PageAgent
// ============================================================================

/// Serves extraction, highlighting and overlay requests for one tab.
pub struct PageAgent<D> {
    tab_id: TabId,
    document: SharedDocument<D>,
}

impl<D> std::fmt::Debug for PageAgent<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageAgent")
            .field("tab_id", &self.tab_id)
            .finish_non_exhaustive()
    }
}

impl<D: Document + 'static> PageAgent<D> {
    /// Creates an agent for `document` in tab `tab_id`.
    #[inline]
    #[must_use]
    pub fn new(tab_id: TabId, document: SharedDocument<D>) -> Self {
        Self { tab_id, document }
    }

    /// Returns the tab this agent serves.
    #[inline]
    #[must_use]
    pub fn tab_id(&self) -> TabId {
        self.tab_id
    }

    /// Handles one request against the document.
    ///
    /// # Errors
    ///
    /// Currently infallible; the `Result` is the boundary contract.
    pub fn handle(&self, request: AgentRequest) -> Result<AgentReply> {
        trace!(tab_id = %self.tab_id, action = request.action(), "Agent request");
        let mut doc = self.document.lock();

        let reply = match request {
            AgentRequest::ExtractContent => AgentReply::Snapshot(extractor::extract(&*doc)),
            AgentRequest::HighlightAnswer {
                question_index,
                option_index,
                grouping,
            } => AgentReply::Highlight(Highlighter::new(grouping).highlight(
                &mut *doc,
                question_index,
                option_index,
            )),
            AgentRequest::AttachOverlay => AgentReply::Overlay(overlay::toggle_overlay(&mut *doc)),
            AgentRequest::AttachProbe => AgentReply::Overlay(overlay::attach_probe(&mut *doc)),
            AgentRequest::RemoveOverlay => AgentReply::Overlay(overlay::remove_overlay(&mut *doc)),
        };

        Ok(reply)
    }

    /// Spawns the agent loop and returns its handle.
    ///
    /// The loop ends when every handle is dropped.
    #[must_use]
    pub fn spawn(self, call_timeout: Option<Duration>) -> AgentHandle {
        let (handle, mut inbox) = channel("page-agent", call_timeout);

        tokio::spawn(async move {
            debug!(tab_id = %self.tab_id, "Page agent started");

            while let Some(call) = inbox.recv().await {
                let (request, responder) = call.into_parts();
                responder.respond(self.handle(request));
            }

            debug!(tab_id = %self.tab_id, "Page agent stopped");
        });

        handle
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::highlighter::HIGHLIGHT_CLASS;
    use crate::page::overlay::OVERLAY_ID;
    use crate::page::static_document::{El, StaticDocument};
    use crate::protocol::{HighlightTier, OverlayState, RadioGrouping};

    fn agent() -> (PageAgent<StaticDocument>, SharedDocument<StaticDocument>) {
        let doc = StaticDocument::new("https://example.com/quiz", "Quiz").with_body([
            El::new("p").text("1) What is 2+2?"),
            El::new("li").id("b").text("B) 4"),
        ]);
        let shared = Arc::new(Mutex::new(doc));
        let tab_id = TabId::new(1).expect("tab id");
        (PageAgent::new(tab_id, Arc::clone(&shared)), shared)
    }

    #[test]
    fn test_handle_extract() {
        let (agent, _) = agent();
        let snapshot = agent
            .handle(AgentRequest::ExtractContent)
            .expect("handle")
            .into_snapshot()
            .expect("snapshot");
        assert_eq!(snapshot.content, "1) What is 2+2?\nB) 4");
    }

    #[test]
    fn test_handle_highlight_writes_document() {
        let (agent, shared) = agent();
        let report = agent
            .handle(AgentRequest::HighlightAnswer {
                question_index: 0,
                option_index: 1,
                grouping: RadioGrouping::default(),
            })
            .expect("handle")
            .into_highlight()
            .expect("highlight");

        assert_eq!(report.tier, Some(HighlightTier::Textual));
        let doc = shared.lock();
        let b = doc.element_by_id("b").expect("li");
        assert!(doc.has_class(b, HIGHLIGHT_CLASS));
    }

    #[tokio::test]
    async fn test_spawned_agent_serves_in_order() {
        let (agent, shared) = agent();
        let handle = agent.spawn(None);

        let first = handle.call(AgentRequest::AttachOverlay).await.expect("call");
        let second = handle.call(AgentRequest::RemoveOverlay).await.expect("call");

        assert_eq!(first.into_overlay().expect("overlay"), OverlayState::Attached);
        assert_eq!(second.into_overlay().expect("overlay"), OverlayState::Removed);
        assert!(shared.lock().element_by_id(OVERLAY_ID).is_none());
    }
}
