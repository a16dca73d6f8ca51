//! Detection service client.
//!
//! One POST per detection, no retries. The mode flag picks between two
//! fixed endpoint paths; the body carries only the snapshot and the URL.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::protocol::{DetectionRequest, DetectionResult, PageLayout};

// ============================================================================
// Constants
// ============================================================================

/// Default service location.
pub const DEFAULT_SERVICE_URL: &str = "http://localhost:8000";

/// Single-model endpoint path.
pub const DETECT_PATH: &str = "/detect";

/// Multi-model endpoint path.
pub const MULTI_DETECT_PATH: &str = "/detect-multi-model";

/// Health endpoint path.
pub const HEALTH_PATH: &str = "/api/health";

/// Default HTTP timeout.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(120);

// ============================================================================
// DetectionService Trait
// ============================================================================

/// External detection service.
#[async_trait]
pub trait DetectionService: Send + Sync {
    /// Sends one snapshot and returns the validated result.
    ///
    /// # Errors
    ///
    /// - [`Error::NetworkFailure`] if the service is unreachable or answers non-2xx
    /// - [`Error::MalformedResponse`] if the body is not a valid result
    async fn detect(&self, request: &DetectionRequest) -> Result<DetectionResult>;

    /// Checks the service is up.
    ///
    /// # Errors
    ///
    /// Same as [`DetectionService::detect`].
    async fn health(&self) -> Result<()>;
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Serialize)]
struct DetectBody<'a> {
    content: &'a str,
    layout: &'a PageLayout,
    url: &'a str,
}

#[derive(Deserialize)]
struct HealthBody {
    status: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: String,
}

// ============================================================================
// HttpDetectionService
// ============================================================================

/// [`DetectionService`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpDetectionService {
    client: reqwest::Client,
    base: Url,
    detect_path: String,
    multi_detect_path: String,
    health_path: String,
    timeout: Duration,
}

impl HttpDetectionService {
    /// Creates a client for the service at `base_url` with default paths.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if `base_url` is not an absolute `http(s)` URL or
    /// the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| Error::config(format!("invalid service URL '{base_url}': {e}")))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(Error::config(format!(
                "service URL must be http or https, got '{}'",
                base.scheme()
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base,
            detect_path: DETECT_PATH.to_string(),
            multi_detect_path: MULTI_DETECT_PATH.to_string(),
            health_path: HEALTH_PATH.to_string(),
            timeout,
        })
    }

    /// Overrides the two detection paths.
    #[must_use]
    pub fn with_paths(mut self, single: impl Into<String>, multi: impl Into<String>) -> Self {
        self.detect_path = single.into();
        self.multi_detect_path = multi.into();
        self
    }

    /// Overrides the health path.
    #[must_use]
    pub fn with_health_path(mut self, path: impl Into<String>) -> Self {
        self.health_path = path.into();
        self
    }

    /// Returns the service base URL.
    #[inline]
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Resolves the detection endpoint for a mode.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if the configured path does not join onto the base.
    pub fn endpoint(&self, use_multi_model: bool) -> Result<Url> {
        let path = if use_multi_model {
            &self.multi_detect_path
        } else {
            &self.detect_path
        };
        self.join(path)
    }

    fn join(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|e| Error::config(format!("invalid endpoint path '{path}': {e}")))
    }

    fn send_error(&self, e: &reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::network(format!(
                "service did not answer within {}ms",
                self.timeout.as_millis()
            ))
        } else {
            Error::network(e.to_string())
        }
    }

    /// Fails on non-2xx, using the service's `detail` text when present.
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.detail)
            .unwrap_or_else(|_| status.canonical_reason().unwrap_or("error").to_string());

        warn!(status = status.as_u16(), %message, "Detection service error");
        Err(Error::http_status(status.as_u16(), message))
    }
}

#[async_trait]
impl DetectionService for HttpDetectionService {
    async fn detect(&self, request: &DetectionRequest) -> Result<DetectionResult> {
        let endpoint = self.endpoint(request.use_multi_model)?;
        let body = DetectBody {
            content: &request.content,
            layout: &request.layout,
            url: &request.url,
        };

        debug!(%endpoint, mode = ?request.mode(), content_len = request.content.len(), "POST detection");

        let response = self
            .client
            .post(endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.send_error(&e))?;
        let response = Self::check_status(response).await?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::network(format!("failed to read response: {e}")))?;
        let result: DetectionResult = serde_json::from_slice(&bytes)
            .map_err(|e| Error::malformed(format!("invalid detection result: {e}")))?;
        result.validate()?;

        info!(
            questions = result.questions.len(),
            mode = ?result.processing_mode,
            cached = result.cached,
            "Detection complete"
        );
        Ok(result)
    }

    async fn health(&self) -> Result<()> {
        let endpoint = self.join(&self.health_path)?;

        let response = self
            .client
            .get(endpoint)
            .send()
            .await
            .map_err(|e| self.send_error(&e))?;
        let response = Self::check_status(response).await?;

        let body: HealthBody = response
            .json()
            .await
            .map_err(|e| Error::malformed(format!("invalid health response: {e}")))?;

        if body.status != "healthy" {
            return Err(Error::malformed(format!(
                "service reports status '{}'",
                body.status
            )));
        }

        debug!(base = %self.base, "Detection service healthy");
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
