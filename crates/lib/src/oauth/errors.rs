//! Error types for the interactive token-acquisition flow.

use std::time::Duration;

use thiserror::Error;

use crate::credential::CredentialError;

/// Errors that can occur while acquiring an elevated credential.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AuthFlowError {
    /// The loopback listener could not bind its fixed port.
    #[error(
        "could not bind the OAuth callback listener on 127.0.0.1:{port}: {detail}. \
         Is another authorization already in progress?"
    )]
    CallbackBind { port: u16, detail: String },

    /// No redirect arrived before the deadline. The browser offers no
    /// cancellation signal, so a closed window surfaces here too.
    #[error(
        "timed out after {}s waiting for the browser authorization; run the command again to retry",
        waited.as_secs()
    )]
    UserCancelledOrTimedOut { waited: Duration },

    /// The redirect arrived but carried no usable authorization code.
    #[error("invalid authorization callback: {reason}")]
    InvalidCallback { reason: String },

    /// The code-for-token exchange was rejected.
    #[error("token exchange failed (HTTP {status}): {detail}")]
    TokenExchangeFailed { status: u16, detail: String },

    /// Connection-level failure talking to the token endpoint.
    #[error("network error during token exchange: {detail}")]
    Network { detail: String },

    /// The callback connection could not be read or answered.
    #[error("callback connection error: {detail}")]
    CallbackIo { detail: String },

    /// Persisting the acquired credential failed. Acquisition without a
    /// durable save is a failure: a restart would lose the upgrade.
    #[error(transparent)]
    Persist(#[from] CredentialError),
}

impl AuthFlowError {
    /// Check if the user abandoned or rejected the flow, as opposed to an
    /// infrastructure failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            AuthFlowError::UserCancelledOrTimedOut { .. }
                | AuthFlowError::InvalidCallback { .. }
        )
    }
}
