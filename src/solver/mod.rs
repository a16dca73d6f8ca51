//! Solver entry point.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Solver`] | Runs the relay, forwards activations, opens panels |
//! | [`SolverBuilder`] | Fluent configuration builder |
//! | [`SolverOptions`] | Service URLs, timeouts, grouping, search base |

// ============================================================================
// Submodules
// ============================================================================

/// Fluent builder.
pub mod builder;

/// Solver implementation.
pub mod core;

/// Configuration.
pub mod options;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::SolverBuilder;
pub use core::Solver;
pub use options::{ENV_RADIO_GROUP_SIZE, ENV_SERVICE_URL, SolverOptions};
