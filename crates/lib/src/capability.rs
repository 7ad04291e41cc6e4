//! Capability resolution: may this credential mutate ACLs, or only read?
//!
//! The service offers no capability-introspection endpoint, and read and
//! write tokens both answer 200 on permission-listing calls, so probing the
//! API is never a valid detection method. Resolution is therefore a pure
//! function of the credential's scope content and its provenance, with no
//! network access. All of the trust heuristics live in this one module so a
//! real introspection call could replace them without touching callers.

use std::fmt;

use crate::constants::{
    SCOPE_FILES_READ_PREFIX, SCOPE_FILES_READWRITE, SCOPE_FILES_READWRITE_ALL,
    SCOPE_SITES_MANAGE_ALL,
};
use crate::credential::{Credential, Provenance};

/// What a credential is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityLevel {
    /// May list and mutate ACLs.
    Full,
    /// May list ACLs only.
    ReadOnly,
    /// Scope content was inconclusive. Internal intermediate only;
    /// [`resolve`] always reduces it before returning.
    Unknown,
}

impl fmt::Display for CapabilityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapabilityLevel::Full => write!(f, "full"),
            CapabilityLevel::ReadOnly => write!(f, "read-only"),
            CapabilityLevel::Unknown => write!(f, "unknown"),
        }
    }
}

/// Resolve the capability of a credential. Never returns
/// [`CapabilityLevel::Unknown`].
///
/// Rules, in order:
///
/// 1. Elevated credential with a scope string: the scope is authoritative.
///    Full requires a write-file scope **and** the sharing-management scope;
///    anything ambiguous stays read-only, never upgraded.
/// 2. Elevated credential without a scope string: `Full`. This trusts
///    provenance over missing content: the only reason the elevated file
///    exists is that it was hand-acquired for editing. It is a deliberate
///    trade-off, not a security boundary; a hand-edited token file without a
///    scope field will be treated as elevated.
/// 3. Fallback credential: always `ReadOnly`, regardless of content. The
///    fallback store never records scope, and success on read endpoints
///    proves nothing about write capability.
pub fn resolve(credential: &Credential) -> CapabilityLevel {
    match (credential.provenance, credential.scope.as_deref()) {
        (Provenance::FallbackStandard, _) => CapabilityLevel::ReadOnly,
        (Provenance::LocalElevated, Some(scope)) => match from_scope(scope) {
            CapabilityLevel::Unknown => CapabilityLevel::ReadOnly,
            level => level,
        },
        (Provenance::LocalElevated, None) => CapabilityLevel::Full,
    }
}

/// Classify a whitespace-separated scope string on its own.
fn from_scope(scope: &str) -> CapabilityLevel {
    let tokens: Vec<&str> = scope.split_whitespace().collect();

    let can_write = tokens
        .iter()
        .any(|t| *t == SCOPE_FILES_READWRITE || *t == SCOPE_FILES_READWRITE_ALL);
    let can_manage = tokens.iter().any(|t| *t == SCOPE_SITES_MANAGE_ALL);

    if can_write && can_manage {
        CapabilityLevel::Full
    } else if tokens.iter().any(|t| t.starts_with(SCOPE_FILES_READ_PREFIX)) {
        CapabilityLevel::ReadOnly
    } else {
        CapabilityLevel::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential(provenance: Provenance, scope: Option<&str>) -> Credential {
        Credential {
            access_token: "tok".to_string(),
            token_type: "Bearer".to_string(),
            expires_at: None,
            scope: scope.map(str::to_string),
            refresh_token: None,
            drive_id: None,
            provenance,
        }
    }

    #[test]
    fn fallback_is_always_read_only() {
        // Even a scope claiming full rights: provenance wins for fallback tokens.
        for scope in [
            None,
            Some("Files.ReadWrite.All Sites.Manage.All"),
            Some("Files.Read"),
        ] {
            let cred = credential(Provenance::FallbackStandard, scope);
            assert_eq!(resolve(&cred), CapabilityLevel::ReadOnly);
        }
    }

    #[test]
    fn full_requires_write_and_site_management() {
        let cred = credential(
            Provenance::LocalElevated,
            Some("Files.Read Files.ReadWrite Files.ReadWrite.All Sites.Manage.All offline_access"),
        );
        assert_eq!(resolve(&cred), CapabilityLevel::Full);

        let cred = credential(
            Provenance::LocalElevated,
            Some("Files.ReadWrite.All Sites.Manage.All"),
        );
        assert_eq!(resolve(&cred), CapabilityLevel::Full);
    }

    #[test]
    fn write_scope_without_site_management_is_read_only() {
        // No partial-credit upgrade.
        let cred = credential(
            Provenance::LocalElevated,
            Some("Files.Read Files.ReadWrite Files.ReadWrite.All offline_access"),
        );
        assert_eq!(resolve(&cred), CapabilityLevel::ReadOnly);
    }

    #[test]
    fn site_management_without_write_scope_is_not_full() {
        let cred = credential(
            Provenance::LocalElevated,
            Some("Files.Read Sites.Manage.All"),
        );
        assert_eq!(resolve(&cred), CapabilityLevel::ReadOnly);
    }

    #[test]
    fn ambiguous_scope_never_upgrades() {
        let cred = credential(Provenance::LocalElevated, Some("User.Read offline_access"));
        assert_eq!(resolve(&cred), CapabilityLevel::ReadOnly);

        let cred = credential(Provenance::LocalElevated, Some(""));
        assert_eq!(resolve(&cred), CapabilityLevel::ReadOnly);
    }

    #[test]
    fn elevated_without_scope_trusts_provenance() {
        let cred = credential(Provenance::LocalElevated, None);
        assert_eq!(resolve(&cred), CapabilityLevel::Full);
    }
}
