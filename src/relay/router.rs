//! Message router.
//!
//! The relay owns no domain state. Each [`Message`] is dispatched through
//! one exhaustive `match`, handled on its own task, and answered exactly
//! once through the call's responder.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::browser::Browser;
use crate::error::{Error, Result};
use crate::identifiers::TabId;
use crate::protocol::{AgentReply, AgentRequest, Message, RadioGrouping, Reply};
use crate::service::DetectionService;
use crate::transport::{Endpoint, channel};

// ============================================================================
// Types
// ============================================================================

/// Panel-side handle to the running relay.
pub type RelayHandle = Endpoint<Message, Reply>;

// ============================================================================
// Relay
// ============================================================================

/// Stateless router between panels, page agents and the detection service.
pub struct Relay {
    pub(super) browser: Arc<dyn Browser>,
    service: Arc<dyn DetectionService>,
    grouping: RadioGrouping,
}

impl fmt::Debug for Relay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Relay")
            .field("grouping", &self.grouping)
            .finish_non_exhaustive()
    }
}

impl Relay {
    /// Creates a relay over a browser host and a detection service.
    #[must_use]
    pub fn new(
        browser: Arc<dyn Browser>,
        service: Arc<dyn DetectionService>,
        grouping: RadioGrouping,
    ) -> Self {
        Self {
            browser,
            service,
            grouping,
        }
    }

    /// Starts the relay loop and returns the handle panels talk to.
    ///
    /// Messages are handled concurrently; the loop ends when every handle
    /// is dropped.
    #[must_use]
    pub fn spawn(self: Arc<Self>, call_timeout: Option<Duration>) -> RelayHandle {
        let (handle, mut inbox) = channel("relay", call_timeout);

        tokio::spawn(async move {
            debug!("Relay started");

            while let Some(call) = inbox.recv().await {
                let relay = Arc::clone(&self);
                tokio::spawn(async move {
                    let (message, responder) = call.into_parts();
                    let result = relay.dispatch(message).await;
                    responder.respond(result);
                });
            }

            debug!("Relay stopped");
        });

        handle
    }

    /// Routes one message and produces its single answer.
    ///
    /// # Errors
    ///
    /// Whatever the routed operation fails with. No retries.
    pub async fn dispatch(&self, message: Message) -> Result<Reply> {
        let action = message.action();
        let tab_id = message.tab_id();
        debug!(%action, ?tab_id, "Dispatching");

        let result = self.route(message).await;

        if let Err(e) = &result {
            if e.is_user_visible() {
                warn!(%action, ?tab_id, error = %e, "Dispatch failed");
            } else {
                debug!(%action, ?tab_id, error = %e, "Dispatch failed");
            }
        }

        result
    }

    async fn route(&self, message: Message) -> Result<Reply> {
        match message {
            Message::DetectMcqs(request) => {
                request.validate()?;
                self.service.detect(&request).await.map(Reply::Detection)
            }

            Message::ExtractContent { tab_id } => self
                .agent_call(tab_id, AgentRequest::ExtractContent)
                .await?
                .into_snapshot()
                .map(Reply::Snapshot),

            Message::HighlightAnswer {
                tab_id,
                question_index,
                option_index,
            } => self
                .agent_call(
                    tab_id,
                    AgentRequest::HighlightAnswer {
                        question_index,
                        option_index,
                        grouping: self.grouping,
                    },
                )
                .await?
                .into_highlight()
                .map(Reply::Highlight),

            Message::CloseWindow { tab_id } => self
                .agent_call(tab_id, AgentRequest::RemoveOverlay)
                .await?
                .into_overlay()
                .map(Reply::Closed),
        }
    }

    /// Calls the page agent of `tab_id`. A closed agent means the tab went away.
    async fn agent_call(&self, tab_id: TabId, request: AgentRequest) -> Result<AgentReply> {
        let agent = self.browser.page_agent(tab_id).await?;
        agent.call(request).await.map_err(|e| match e {
            Error::ChannelClosed => Error::target_unavailable(format!("tab {tab_id} was closed")),
            other => other,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
