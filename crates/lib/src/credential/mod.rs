//! Credential loading, persistence, and freshness checks.
//!
//! Two sources feed this module:
//!
//! * the **local elevated token file** (`token.json`), written by the
//!   interactive acquisition flow and owned by this tool, and
//! * the **rclone config** as a read-only fallback, whose token blobs never
//!   carry a `scope` field.
//!
//! Every loaded [`Credential`] is tagged with a [`Provenance`] recording which
//! source it came from. Token content alone cannot distinguish the two
//! sources, so the tag is attached at load time and never derived later.

mod errors;

pub use errors::CredentialError;

use std::fmt;
use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::EXPIRY_BUFFER_SECS;

/// Which store a credential was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// The tool's own token file, acquired interactively for ACL editing.
    LocalElevated,
    /// An rclone remote's cached token. Read-only by definition.
    FallbackStandard,
}

impl Default for Provenance {
    // The safe default: an untagged credential is assumed read-only.
    fn default() -> Self {
        Provenance::FallbackStandard
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::LocalElevated => write!(f, "local elevated token"),
            Provenance::FallbackStandard => write!(f, "rclone fallback token"),
        }
    }
}

/// An OAuth bearer credential plus the metadata needed to reason about it.
///
/// Credentials are immutable once loaded: expiry or downgrade produces a new
/// `Credential` (typically the fallback one) rather than patching this one.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credential {
    /// The bearer token presented to the service.
    pub access_token: String,

    /// Token type, `Bearer` in practice.
    #[serde(default = "default_token_type")]
    pub token_type: String,

    /// Absolute expiry instant. A credential without one is treated as
    /// already expired (fail-safe).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,

    /// Space-separated scope string, verbatim as issued. Authoritative for
    /// capability resolution when present; persisted byte-for-byte.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// Refresh token, when the issuer granted `offline_access`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Drive identifier this credential was last used against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drive_id: Option<String>,

    /// Source tag, attached at load time. Not serialized.
    #[serde(skip)]
    pub provenance: Provenance,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl Credential {
    /// True if this credential should not be presented to the service:
    /// `expires_at` is absent, or lies within `buffer_secs` of now. The
    /// buffer guards against tokens expiring mid-request.
    pub fn is_expired(&self, buffer_secs: i64) -> bool {
        match self.expires_at {
            None => true,
            Some(at) => at - Utc::now() < chrono::Duration::seconds(buffer_secs),
        }
    }

    /// [`Credential::is_expired`] with the standard buffer.
    pub fn is_stale(&self) -> bool {
        self.is_expired(EXPIRY_BUFFER_SECS)
    }
}

// Hand-written so token material never lands in logs.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("expires_at", &self.expires_at)
            .field("scope", &self.scope)
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("drive_id", &self.drive_id)
            .field("provenance", &self.provenance)
            .finish()
    }
}

/// Shape of the token blob embedded in an rclone config section. Only the
/// fields this tool consumes; rclone never stores a scope.
#[derive(Debug, Deserialize)]
struct RcloneToken {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    expiry: Option<String>,
}

/// Reads and writes the local elevated token file, and reads rclone's config
/// as a read-only fallback source.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    token_path: PathBuf,
    rclone_conf_path: PathBuf,
}

impl CredentialStore {
    /// Build a store over explicit file locations.
    pub fn from_paths(token_path: PathBuf, rclone_conf_path: PathBuf) -> Self {
        Self {
            token_path,
            rclone_conf_path,
        }
    }

    /// Build a store over the platform's default locations:
    /// `<config>/driveacl/token.json` and `<config>/rclone/rclone.conf`.
    pub fn discover() -> Result<Self, CredentialError> {
        let config = dirs::config_dir().ok_or(CredentialError::NoConfigDir)?;
        Ok(Self::from_paths(
            config.join("driveacl").join("token.json"),
            config.join("rclone").join("rclone.conf"),
        ))
    }

    /// Build a store with an explicit token file and the default rclone
    /// config location.
    pub fn with_token_path(token_path: PathBuf) -> Result<Self, CredentialError> {
        let config = dirs::config_dir().ok_or(CredentialError::NoConfigDir)?;
        Ok(Self::from_paths(
            token_path,
            config.join("rclone").join("rclone.conf"),
        ))
    }

    /// Location of the local elevated token file.
    pub fn token_path(&self) -> &Path {
        &self.token_path
    }

    /// Load the local elevated token file.
    ///
    /// A present-but-unusable file is an error rather than a silent
    /// downgrade; an absent file is `NotFound`.
    pub fn load_local(&self) -> Result<Credential, CredentialError> {
        let raw = match fs::read_to_string(&self.token_path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CredentialError::NotFound {
                    path: self.token_path.clone(),
                });
            }
            Err(e) => {
                return Err(CredentialError::Read {
                    path: self.token_path.clone(),
                    source: e,
                });
            }
        };

        let mut credential: Credential =
            serde_json::from_str(&raw).map_err(|e| CredentialError::Malformed {
                path: self.token_path.clone(),
                reason: e.to_string(),
            })?;

        if credential.access_token.is_empty() {
            return Err(CredentialError::Malformed {
                path: self.token_path.clone(),
                reason: "access_token field is empty".to_string(),
            });
        }

        credential.provenance = Provenance::LocalElevated;
        tracing::debug!(path = %self.token_path.display(), "loaded local credential");
        Ok(credential)
    }

    /// Load the fallback credential from the rclone config section named
    /// `remote`.
    ///
    /// Only the access token (and the expiry stamp, for freshness warnings)
    /// is taken; the result always has `scope = None` so capability
    /// resolution can never be fooled into treating it as elevated.
    pub fn load_fallback(&self, remote: &str) -> Result<Credential, CredentialError> {
        let raw = match fs::read_to_string(&self.rclone_conf_path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CredentialError::RemoteNotFound {
                    remote: remote.to_string(),
                    path: self.rclone_conf_path.clone(),
                });
            }
            Err(e) => {
                return Err(CredentialError::Read {
                    path: self.rclone_conf_path.clone(),
                    source: e,
                });
            }
        };

        let token_json = section_value(&raw, remote, "token").ok_or_else(|| {
            if section_exists(&raw, remote) {
                CredentialError::FallbackTokenMissing {
                    remote: remote.to_string(),
                }
            } else {
                CredentialError::RemoteNotFound {
                    remote: remote.to_string(),
                    path: self.rclone_conf_path.clone(),
                }
            }
        })?;

        let token: RcloneToken =
            serde_json::from_str(&token_json).map_err(|_| CredentialError::FallbackTokenMissing {
                remote: remote.to_string(),
            })?;

        let access_token = match token.access_token {
            Some(t) if !t.is_empty() => t,
            _ => {
                return Err(CredentialError::FallbackTokenMissing {
                    remote: remote.to_string(),
                });
            }
        };

        let expires_at = token
            .expiry
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|t| t.with_timezone(&Utc));

        tracing::debug!(remote, "loaded fallback credential from rclone config");
        Ok(Credential {
            access_token,
            token_type: default_token_type(),
            expires_at,
            scope: None,
            refresh_token: None,
            drive_id: None,
            provenance: Provenance::FallbackStandard,
        })
    }

    /// Persist a credential to the local token file, mode 0600.
    ///
    /// The scope string is written verbatim when present; dropping it here
    /// would silently demote future capability resolution to the provenance
    /// heuristic.
    pub fn save(&self, credential: &Credential) -> Result<(), CredentialError> {
        let write_err = |source| CredentialError::Write {
            path: self.token_path.clone(),
            source,
        };

        if let Some(parent) = self.token_path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let body = serde_json::to_string_pretty(credential).map_err(|e| {
            CredentialError::Write {
                path: self.token_path.clone(),
                source: std::io::Error::other(e),
            }
        })?;

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.token_path).map_err(write_err)?;
        file.write_all(body.as_bytes()).map_err(write_err)?;

        // An existing file keeps its old mode; tighten it explicitly.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.token_path, fs::Permissions::from_mode(0o600))
                .map_err(write_err)?;
        }

        tracing::info!(path = %self.token_path.display(), "saved credential");
        Ok(())
    }

    /// Delete the local token file. Called when the service reports the
    /// credential invalid, or after proactive expiry detection. A missing
    /// file is not an error.
    pub fn invalidate_local(&self) -> Result<(), CredentialError> {
        match fs::remove_file(&self.token_path) {
            Ok(()) => {
                tracing::info!(path = %self.token_path.display(), "invalidated local credential");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CredentialError::Write {
                path: self.token_path.clone(),
                source: e,
            }),
        }
    }
}

/// Minimal scan over an INI-style config: find `key = value` inside
/// `[section]`. Full rclone config parsing (encryption, includes) is out of
/// scope; this covers the plain-text token blobs the fallback path needs.
fn section_value(raw: &str, section: &str, key: &str) -> Option<String> {
    let mut in_section = false;
    for line in raw.lines() {
        let line = line.trim();
        if line.starts_with('[') && line.ends_with(']') {
            in_section = line[1..line.len() - 1].trim() == section;
            continue;
        }
        if !in_section || line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some((k, v)) = line.split_once('=')
            && k.trim() == key
        {
            return Some(v.trim().to_string());
        }
    }
    None
}

fn section_exists(raw: &str, section: &str) -> bool {
    raw.lines().any(|line| {
        let line = line.trim();
        line.starts_with('[')
            && line.ends_with(']')
            && line[1..line.len() - 1].trim() == section
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> CredentialStore {
        CredentialStore::from_paths(
            dir.path().join("token.json"),
            dir.path().join("rclone.conf"),
        )
    }

    fn elevated(scope: Option<&str>) -> Credential {
        Credential {
            access_token: "tok-abc".to_string(),
            token_type: "Bearer".to_string(),
            expires_at: Some(Utc::now() + chrono::Duration::hours(1)),
            scope: scope.map(str::to_string),
            refresh_token: Some("refresh-xyz".to_string()),
            drive_id: Some("5D1B2B3BE100F93B".to_string()),
            provenance: Provenance::LocalElevated,
        }
    }

    #[test]
    fn save_then_load_preserves_scope_verbatim() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let scope = "Files.Read Files.ReadWrite Files.ReadWrite.All Sites.Manage.All offline_access";

        store.save(&elevated(Some(scope))).unwrap();
        let loaded = store.load_local().unwrap();

        assert_eq!(loaded.scope.as_deref(), Some(scope));
        assert_eq!(loaded.provenance, Provenance::LocalElevated);
        assert_eq!(loaded.access_token, "tok-abc");
    }

    #[cfg(unix)]
    #[test]
    fn saved_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save(&elevated(None)).unwrap();

        let mode = fs::metadata(store.token_path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = store_in(&dir).load_local().unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn empty_access_token_is_malformed() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(store.token_path(), r#"{"access_token": ""}"#).unwrap();

        let err = store.load_local().unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn missing_expiry_means_expired() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(store.token_path(), r#"{"access_token": "tok"}"#).unwrap();

        let cred = store.load_local().unwrap();
        assert!(cred.is_stale());
    }

    #[test]
    fn expiry_buffer_boundary() {
        let mut cred = elevated(None);

        cred.expires_at = Some(Utc::now() + chrono::Duration::seconds(299));
        assert!(cred.is_expired(300), "inside the buffer counts as expired");

        cred.expires_at = Some(Utc::now() + chrono::Duration::seconds(301));
        assert!(!cred.is_expired(300), "outside the buffer is still fresh");
    }

    #[test]
    fn fallback_credential_never_has_scope() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(
            dir.path().join("rclone.conf"),
            concat!(
                "[OneDrive]\n",
                "type = onedrive\n",
                r#"token = {"access_token":"fallback-tok","token_type":"Bearer","refresh_token":"r","expiry":"2030-01-02T15:04:05.999+10:00"}"#,
                "\n",
                "drive_type = personal\n",
            ),
        )
        .unwrap();

        let cred = store.load_fallback("OneDrive").unwrap();
        assert_eq!(cred.access_token, "fallback-tok");
        assert_eq!(cred.scope, None);
        assert_eq!(cred.provenance, Provenance::FallbackStandard);
        assert!(cred.expires_at.is_some());
    }

    #[test]
    fn fallback_unknown_remote() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(dir.path().join("rclone.conf"), "[Other]\ntype = s3\n").unwrap();

        let err = store.load_fallback("OneDrive").unwrap_err();
        assert!(matches!(err, CredentialError::RemoteNotFound { .. }));
    }

    #[test]
    fn fallback_section_without_token() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(dir.path().join("rclone.conf"), "[OneDrive]\ntype = onedrive\n").unwrap();

        let err = store.load_fallback("OneDrive").unwrap_err();
        assert!(matches!(err, CredentialError::FallbackTokenMissing { .. }));
    }

    #[test]
    fn debug_redacts_token_material() {
        let rendered = format!("{:?}", elevated(Some("Files.Read")));
        assert!(!rendered.contains("tok-abc"));
        assert!(!rendered.contains("refresh-xyz"));
        assert!(rendered.contains("<redacted>"));
    }
}
