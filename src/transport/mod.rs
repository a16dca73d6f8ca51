//! Cross-context transport layer.
//!
//! The three contexts (panel, relay, page agent) share no memory. They
//! talk only through typed channels, one request in, one envelope out.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐   Message/Reply    ┌─────────────┐  AgentRequest/Reply  ┌──────────────┐
//! │    Panel    │───────────────────►│    Relay    │─────────────────────►│  Page Agent  │
//! │  Endpoint   │◄───────────────────│   Inbox     │◄─────────────────────│    Inbox     │
//! └─────────────┘      Envelope      └──────┬──────┘       Envelope       └──────────────┘
//!                                           │ HTTP
//!                                           ▼
//!                                 Detection Service
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `channel` | Endpoint/Inbox pair with one-shot replies |

// ============================================================================
// Submodules
// ============================================================================

/// Typed request/response channel.
pub mod channel;

// ============================================================================
// Re-exports
// ============================================================================

pub use channel::{Call, Endpoint, Inbox, Responder, channel};
