//!
//! driveacl: inspect and edit sharing ACLs on a OneDrive drive through the
//! Microsoft Graph API.
//!
//! ## Core Concepts
//!
//! * **Credentials (`credential::Credential`)**: OAuth bearer tokens loaded either
//!   from the locally cached elevated token file or from an rclone config as a
//!   read-only fallback. Every credential carries a `Provenance` tag recording
//!   which source it came from.
//! * **Capability (`capability`)**: a pure resolver that decides, from scope
//!   content and provenance, whether a credential may mutate ACLs (`Full`) or
//!   only read them (`ReadOnly`).
//! * **Acquisition (`oauth::AcquisitionFlow`)**: the interactive browser-based
//!   authorization-code flow that produces a fresh elevated credential and
//!   persists it before handing it back.
//! * **Graph client (`graph::GraphClient`)**: stateless request wrappers over the
//!   Graph drive-item and permission endpoints, behind the `graph::AclApi` trait.
//! * **Engine (`engine::AclEngine`)**: the orchestration layer for invite,
//!   remove, strip, and bulk-remove operations, with capability gating and
//!   bounded retry.
//! * **Session (`session::Session`)**: single-owner per-invocation state tying a
//!   credential store and the active credential together.
//! * **Scanner (`scanner::SharedItemScanner`)**: lazy breadth-first discovery of
//!   items carrying a sharing facet.

pub mod capability;
pub mod constants;
pub mod credential;
pub mod engine;
pub mod graph;
pub mod oauth;
pub mod scanner;
pub mod session;

pub use capability::CapabilityLevel;
pub use credential::{Credential, CredentialStore, Provenance};
pub use session::Session;

/// Result type used throughout the driveacl library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the driveacl library.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured credential errors from the credential module
    #[error(transparent)]
    Credential(#[from] credential::CredentialError),

    /// Structured acquisition-flow errors from the oauth module
    #[error(transparent)]
    OAuth(#[from] oauth::AuthFlowError),

    /// Structured remote API errors from the graph module
    #[error(transparent)]
    Graph(#[from] graph::GraphError),

    /// Structured orchestration errors from the engine module
    #[error(transparent)]
    Engine(#[from] engine::EngineError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Credential(_) => "credential",
            Error::OAuth(_) => "oauth",
            Error::Graph(_) => "graph",
            Error::Engine(_) => "engine",
            Error::Io(_) => "io",
            Error::Serialize(_) => "serialize",
        }
    }

    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Credential(err) => err.is_not_found(),
            Error::Graph(err) => err.is_not_found(),
            Error::Engine(err) => err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error is recoverable by the user taking a corrective
    /// action (acquiring an elevated token, refreshing a stale one, or
    /// waiting out a rate limit). The `Display` text of these errors carries
    /// the suggested action.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::Engine(err) => err.is_recoverable(),
            Error::Graph(err) => err.is_rate_limited(),
            Error::OAuth(err) => err.is_cancelled(),
            _ => false,
        }
    }

    /// Check if this error indicates the remote side refused the operation.
    pub fn is_access_denied(&self) -> bool {
        match self {
            Error::Graph(err) => err.is_access_denied(),
            _ => false,
        }
    }
}
