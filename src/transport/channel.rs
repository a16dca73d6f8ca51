//! Typed request/response channel between contexts.
//!
//! Each context owns an [`Inbox`] and hands out cloneable [`Endpoint`]s.
//! A call carries its own one-shot reply slot, so every request gets
//! exactly one answer: the [`Responder`] is consumed by
//! [`Responder::respond`] and cannot answer twice.
//!
//! # Call Lifecycle
//!
//! 1. `Endpoint::call` - wrap request in a [`Call`], queue it
//! 2. Serving context - `Inbox::recv`, handle, `Responder::respond`
//! 3. Caller - receive the [`Envelope`], unwrap into `Result`
//!
//! If the caller stopped waiting (timeout, or its context was torn down),
//! the answer is dropped and logged; the serving side is unaffected.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::identifiers::RequestId;
use crate::protocol::Envelope;

// ============================================================================
// Channel Constructor
// ============================================================================

/// Creates a channel named `name` for logging.
///
/// Calls through the returned endpoint wait at most `call_timeout`, or
/// forever when `None`.
#[must_use]
pub fn channel<Req, Rep>(
    name: &'static str,
    call_timeout: Option<Duration>,
) -> (Endpoint<Req, Rep>, Inbox<Req, Rep>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let endpoint = Endpoint {
        name,
        tx,
        call_timeout,
        pending: Arc::new(AtomicUsize::new(0)),
    };
    (endpoint, Inbox { name, rx })
}

// ============================================================================
// Call
// ============================================================================

/// A request plus its single reply slot.
pub struct Call<Req, Rep> {
    /// Correlation ID, for logging.
    pub id: RequestId,
    /// The request payload.
    pub request: Req,
    responder: Responder<Rep>,
}

impl<Req, Rep> Call<Req, Rep> {
    /// Splits the call into its request and responder.
    #[inline]
    #[must_use]
    pub fn into_parts(self) -> (Req, Responder<Rep>) {
        (self.request, self.responder)
    }
}

impl<Req: fmt::Debug, Rep> fmt::Debug for Call<Req, Rep> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Call")
            .field("id", &self.id)
            .field("request", &self.request)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Responder
// ============================================================================

/// Answers one [`Call`]. Consumed on use.
pub struct Responder<Rep> {
    id: RequestId,
    tx: oneshot::Sender<Envelope<Rep>>,
}

impl<Rep> Responder<Rep> {
    /// Sends the answer, converting errors into a failure envelope.
    ///
    /// Returns `false` if the caller is gone and the answer was discarded.
    pub fn respond(self, result: Result<Rep>) -> bool {
        let envelope = Envelope::from(result);
        let success = envelope.is_success();

        if self.tx.send(envelope).is_err() {
            debug!(request_id = %self.id, "Caller gone, reply discarded");
            return false;
        }

        trace!(request_id = %self.id, success, "Reply sent");
        true
    }

    /// Returns the correlation ID of the call being answered.
    #[inline]
    #[must_use]
    pub fn id(&self) -> RequestId {
        self.id
    }
}

// ============================================================================
// Endpoint
// ============================================================================

/// Sending half of a channel. Cheap to clone.
pub struct Endpoint<Req, Rep> {
    name: &'static str,
    tx: mpsc::UnboundedSender<Call<Req, Rep>>,
    call_timeout: Option<Duration>,
    pending: Arc<AtomicUsize>,
}

impl<Req, Rep> Clone for Endpoint<Req, Rep> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            tx: self.tx.clone(),
            call_timeout: self.call_timeout,
            pending: Arc::clone(&self.pending),
        }
    }
}

impl<Req, Rep> fmt::Debug for Endpoint<Req, Rep> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("name", &self.name)
            .field("pending", &self.pending_count())
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

impl<Req, Rep> Endpoint<Req, Rep> {
    /// Sends a request and waits for its single answer.
    ///
    /// # Errors
    ///
    /// - [`Error::ChannelClosed`] if the serving context is gone
    /// - [`Error::Timeout`] if no answer arrived within the call timeout
    /// - [`Error::Remote`] if the serving context answered with a failure
    pub async fn call(&self, request: Req) -> Result<Rep> {
        let id = RequestId::generate();
        let (tx, rx) = oneshot::channel();

        self.tx
            .send(Call {
                id,
                request,
                responder: Responder { id, tx },
            })
            .map_err(|_| Error::ChannelClosed)?;

        let _pending = PendingGuard::new(&self.pending);
        trace!(channel = self.name, request_id = %id, "Call sent");

        let envelope = match self.call_timeout {
            Some(limit) => timeout(limit, rx).await.map_err(|_| {
                debug!(channel = self.name, request_id = %id, "Call timed out");
                Error::timeout(self.name, limit.as_millis() as u64)
            })??,
            None => rx.await?,
        };

        envelope.into_result()
    }

    /// Returns the number of calls awaiting an answer.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    /// Returns `true` if the serving context dropped its inbox.
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Returns the channel name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Keeps the pending counter accurate even if the caller's future is dropped.
struct PendingGuard<'a>(&'a AtomicUsize);

impl<'a> PendingGuard<'a> {
    fn new(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::AcqRel);
        Self(counter)
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

// ============================================================================
// Inbox
// ============================================================================

/// Receiving half of a channel, owned by the serving context.
pub struct Inbox<Req, Rep> {
    name: &'static str,
    rx: mpsc::UnboundedReceiver<Call<Req, Rep>>,
}

impl<Req, Rep> Inbox<Req, Rep> {
    /// Waits for the next call. Returns `None` once every endpoint is dropped.
    pub async fn recv(&mut self) -> Option<Call<Req, Rep>> {
        let call = self.rx.recv().await;
        if call.is_none() {
            debug!(channel = self.name, "All endpoints dropped");
        }
        call
    }

    /// Returns the channel name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

// ============================================================================
// Tests
// ============================================================================
