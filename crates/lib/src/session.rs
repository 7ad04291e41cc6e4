//! Per-invocation session state.
//!
//! One `Session` owns the credential store and the active credential for the
//! lifetime of a single CLI invocation. There is no process-global state:
//! every component that needs the credential is handed the session (or a
//! borrow of it) explicitly, and credential swaps (elevation, fallback after
//! a 401) replace the whole `Credential` value rather than patching it.

use crate::capability::{self, CapabilityLevel};
use crate::credential::{Credential, CredentialError, CredentialStore, Provenance};
use crate::oauth::{AcquisitionFlow, AuthFlowError};

/// The active credential plus where it came from and how to replace it.
#[derive(Debug)]
pub struct Session {
    store: CredentialStore,
    remote: String,
    credential: Credential,
}

impl Session {
    /// Load a session: the local elevated credential if present and fresh,
    /// otherwise the fallback remote's token.
    ///
    /// A local file with no expiry stamp counts as expired (fail-safe) and
    /// falls through to the fallback without raising; a local file that is
    /// present but malformed is an error rather than a silent downgrade.
    pub fn load(store: CredentialStore, remote: impl Into<String>) -> Result<Self, CredentialError> {
        let remote = remote.into();

        let credential = match store.load_local() {
            Ok(cred) if !cred.is_stale() => {
                tracing::debug!("using local elevated credential");
                cred
            }
            Ok(_) => {
                tracing::info!(
                    remote,
                    "local credential expired; falling back to the rclone token"
                );
                store.load_fallback(&remote)?
            }
            Err(e) if e.is_not_found() => {
                tracing::debug!(
                    remote,
                    "no local credential; falling back to the rclone token"
                );
                store.load_fallback(&remote)?
            }
            Err(e) => return Err(e),
        };

        if credential.provenance == Provenance::FallbackStandard && credential.is_stale() {
            tracing::warn!(
                "fallback token looks stale; refresh it with `rclone config reconnect {remote}:`"
            );
        }

        Ok(Self {
            store,
            remote,
            credential,
        })
    }

    /// Build a session around an already-loaded credential.
    pub fn with_credential(
        store: CredentialStore,
        remote: impl Into<String>,
        credential: Credential,
    ) -> Self {
        Self {
            store,
            remote: remote.into(),
            credential,
        }
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn remote(&self) -> &str {
        &self.remote
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// Capability of the active credential. Pure; no network.
    pub fn capability(&self) -> CapabilityLevel {
        capability::resolve(&self.credential)
    }

    /// Run the interactive acquisition flow and install the new elevated
    /// credential. The flow persists it before returning, so a later restart
    /// keeps the upgrade.
    pub async fn elevate(
        &mut self,
        flow: &AcquisitionFlow,
    ) -> Result<CapabilityLevel, AuthFlowError> {
        let credential = flow.acquire(&self.store).await?;
        self.credential = credential;
        Ok(self.capability())
    }

    /// React to a 401 from the service: discard the local credential and
    /// swap in the fallback one. The triggering operation still fails; the
    /// fallback can never retroactively satisfy a mutation.
    pub fn handle_unauthorized(&mut self) -> Result<(), CredentialError> {
        if self.credential.provenance == Provenance::LocalElevated {
            tracing::warn!("service rejected the elevated credential; discarding it");
            self.store.invalidate_local()?;
        } else {
            tracing::warn!("service rejected the fallback credential");
        }
        self.credential = self.store.load_fallback(&self.remote)?;
        Ok(())
    }
}
