//! Credential error types.

use std::path::PathBuf;
use thiserror::Error as ThisError;

/// Errors that can occur while loading or persisting credentials.
#[non_exhaustive]
#[derive(Debug, ThisError)]
pub enum CredentialError {
    /// The local token file does not exist.
    #[error("no credential file at {}", path.display())]
    NotFound {
        /// Path that was checked
        path: PathBuf,
    },

    /// The local token file exists but cannot be used.
    #[error("malformed credential in {}: {reason}", path.display())]
    Malformed {
        /// Path of the offending file
        path: PathBuf,
        /// Why the contents were rejected
        reason: String,
    },

    /// The requested remote has no section in the fallback config.
    #[error("remote '{remote}' not found in {}", path.display())]
    RemoteNotFound {
        /// Remote name that was looked up
        remote: String,
        /// Config file that was searched
        path: PathBuf,
    },

    /// The fallback config section exists but carries no usable token.
    #[error("remote '{remote}' has no cached token. Authenticate it first: rclone config reconnect {remote}:")]
    FallbackTokenMissing {
        /// Remote name that was looked up
        remote: String,
    },

    /// Filesystem read failure.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Filesystem write failure.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No platform config directory to place credential files in.
    #[error("no config directory available to locate credential files")]
    NoConfigDir,
}

impl CredentialError {
    /// Check if this error means a credential source simply was not there.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CredentialError::NotFound { .. }
                | CredentialError::RemoteNotFound { .. }
                | CredentialError::FallbackTokenMissing { .. }
        )
    }

    /// Check if this error indicates an unusable (rather than absent) file.
    pub fn is_malformed(&self) -> bool {
        matches!(self, CredentialError::Malformed { .. })
    }
}
