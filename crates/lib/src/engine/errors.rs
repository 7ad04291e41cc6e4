//! Error types for ACL orchestration.

use thiserror::Error;

use crate::capability::CapabilityLevel;
use crate::credential::CredentialError;
use crate::graph::GraphError;

/// Errors surfaced by [`crate::engine::AclEngine`] operations.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum EngineError {
    /// A mutation was requested with a credential that cannot mutate.
    /// Checked locally, before any request leaves the machine.
    #[error(
        "this operation edits ACLs but the active credential is {level}; \
         run `driveacl auth` to acquire an elevated token"
    )]
    InsufficientCapability { level: CapabilityLevel },

    /// The service rejected the credential mid-operation. The local token
    /// has already been discarded; the session now runs on the fallback.
    #[error(
        "the service rejected the credential and the local token was discarded; \
         run `driveacl auth` to re-authorize, then rerun the command"
    )]
    CredentialExpired,

    /// A remote call failed after any applicable retries.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Credential store access failed during fallback handling.
    #[error(transparent)]
    Credential(#[from] CredentialError),
}

impl EngineError {
    /// Check if the user can recover by taking the action named in the
    /// error text (re-authorizing or waiting out a throttle).
    pub fn is_recoverable(&self) -> bool {
        match self {
            EngineError::InsufficientCapability { .. } | EngineError::CredentialExpired => true,
            EngineError::Graph(err) => err.is_rate_limited(),
            EngineError::Credential(_) => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, EngineError::Graph(err) if err.is_not_found())
    }
}
