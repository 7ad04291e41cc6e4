//! Error types for remote Graph API calls.

use std::time::Duration;

use thiserror::Error;

/// Errors surfaced by [`crate::graph::GraphClient`] calls.
///
/// A received error status and a timeout are distinct failure kinds: a
/// timeout says nothing about whether the request executed.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum GraphError {
    /// The item or permission does not exist (HTTP 404). Often benign;
    /// deletion paths reclassify it before it reaches a caller.
    #[error("not found: {resource}")]
    NotFound { resource: String },

    /// The service refused the operation (HTTP 403).
    #[error("access denied by the service: {detail}")]
    AccessDenied { detail: String },

    /// The credential was rejected (HTTP 401).
    #[error("credential rejected by the service")]
    Unauthorized,

    /// Throttled (HTTP 429). Carries the server's wait hint, or the default
    /// when the header is absent.
    #[error("rate limited; retry after {}s", retry_after.as_secs())]
    RateLimited { retry_after: Duration },

    /// Transient server-side failure (HTTP 5xx), retryable.
    #[error("transient server error (HTTP {status}): {detail}")]
    TransientServer { status: u16, detail: String },

    /// Any other received error status.
    #[error("request failed (HTTP {status}): {detail}")]
    Status { status: u16, detail: String },

    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// Connection-level failure before a status was received.
    #[error("network error: {detail}")]
    Network { detail: String },

    /// A success status carried a body this tool could not interpret.
    #[error("unexpected response body: {detail}")]
    InvalidResponse { detail: String },
}

impl GraphError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, GraphError::NotFound { .. })
    }

    pub fn is_access_denied(&self) -> bool {
        matches!(self, GraphError::AccessDenied { .. })
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, GraphError::RateLimited { .. })
    }

    /// Check if retrying the same call may succeed without user action.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GraphError::RateLimited { .. } | GraphError::TransientServer { .. }
        )
    }
}

impl From<reqwest::Error> for GraphError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GraphError::Timeout
        } else {
            // reqwest error text never includes request headers, so no token
            // material can leak through here.
            GraphError::Network {
                detail: err.to_string(),
            }
        }
    }
}
