//! External detection service.
//!
//! The service is a black box reached over HTTP. [`DetectionService`] is the
//! seam; [`HttpDetectionService`] is the production client.

// ============================================================================
// Submodules
// ============================================================================

/// HTTP client and service trait.
pub mod client;

// ============================================================================
// Re-exports
// ============================================================================

pub use client::{
    DEFAULT_HTTP_TIMEOUT, DEFAULT_SERVICE_URL, DETECT_PATH, DetectionService, HEALTH_PATH,
    HttpDetectionService, MULTI_DETECT_PATH,
};
