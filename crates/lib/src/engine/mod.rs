//! Orchestration of ACL operations.
//!
//! [`AclEngine`] sits between the CLI and the remote API. It owns the
//! policies the raw client does not: the local capability gate in front of
//! every mutation, bounded retry of throttled and transient failures, the
//! owner and inheritance guards, and the credential-fallback reaction to a
//! rejected token. Every mutation decision works from a fresh ACL fetch;
//! permission entries are never cached across mutating calls.

mod errors;

pub use errors::EngineError;

use std::future::Future;

use crate::capability::CapabilityLevel;
use crate::constants::{MAX_RETRY_ATTEMPTS, TRANSIENT_RETRY_DELAY};
use crate::credential::Credential;
use crate::graph::{AclApi, DeleteOutcome, GraphError, InviteRole, ItemRef, PermissionEntry};
use crate::session::Session;

/// Outcome of a single invite.
#[derive(Debug)]
pub struct InviteReceipt {
    pub item: ItemRef,
    pub email: String,
    pub role: InviteRole,
    /// The permission entries the service reports as created or updated.
    pub granted: Vec<PermissionEntry>,
}

/// Outcome of removing one user's grants from one item.
#[derive(Debug, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// At least one grant was deleted.
    Removed { permission_ids: Vec<String> },
    /// The user held no removable grant. Idempotent success, not an error.
    NothingToRemove,
}

/// One failed deletion inside a strip run.
#[derive(Debug)]
pub struct StripFailure {
    pub permission_id: String,
    pub error: GraphError,
}

/// Outcome of stripping every explicit grant from an item.
///
/// A strip keeps going past individual failures so one stuck permission
/// does not leave the rest of the ACL untouched. `aborted` is the one
/// exception: a rejected credential stops the run, since every further
/// call would fail the same way.
#[derive(Debug, Default)]
pub struct StripReport {
    pub removed: Vec<String>,
    pub already_absent: Vec<String>,
    pub failures: Vec<StripFailure>,
    pub aborted: bool,
}

impl StripReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && !self.aborted
    }
}

/// One failed path inside a bulk-remove run.
#[derive(Debug)]
pub struct BulkFailure {
    pub path: String,
    pub error: GraphError,
}

/// Per-path outcome of removing one user across many items.
#[derive(Debug, Default)]
pub struct BulkRemoveReport {
    /// Paths where at least one grant was deleted.
    pub removed: Vec<String>,
    /// Paths that did not resolve to an item.
    pub not_found: Vec<String>,
    /// Paths where the user held no removable grant.
    pub no_grant: Vec<String>,
    pub failures: Vec<BulkFailure>,
    /// True when a rejected credential cut the run short; remaining paths
    /// were not attempted.
    pub aborted: bool,
}

/// ACL operations over an [`AclApi`] implementation.
#[derive(Debug)]
pub struct AclEngine<A: AclApi> {
    api: A,
}

impl<A: AclApi> AclEngine<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Resolve a path and list its full ACL. Works at any capability level.
    pub async fn list_acl(
        &self,
        session: &mut Session,
        path: &str,
    ) -> Result<(ItemRef, Vec<PermissionEntry>), EngineError> {
        let cred = session.credential().clone();
        let result = self.fetch_acl(&cred, path).await;
        result.map_err(|e| reject_or_wrap(session, e))
    }

    /// Grant `role` on `path` to `email` via a sharing invitation.
    ///
    /// Only a throttled invite is retried. A transient server failure may
    /// have executed before failing, and a blind retry would send the
    /// recipient a second notification mail.
    pub async fn invite(
        &self,
        session: &mut Session,
        path: &str,
        email: &str,
        role: InviteRole,
    ) -> Result<InviteReceipt, EngineError> {
        require_full(session)?;
        let cred = session.credential().clone();

        let result = async {
            let item = self.resolve(&cred, path).await?;
            let granted = retry(
                "invite",
                GraphError::is_rate_limited,
                || self.api.invite(&cred, &item.id, email, role),
            )
            .await?;
            Ok(InviteReceipt {
                item,
                email: email.to_string(),
                role,
                granted,
            })
        }
        .await;
        result.map_err(|e| reject_or_wrap(session, e))
    }

    /// Remove every grant `email` holds on `path`. Owner grants are never
    /// touched. Removing a user who holds no grant is a no-op success.
    pub async fn remove_by_email(
        &self,
        session: &mut Session,
        path: &str,
        email: &str,
    ) -> Result<RemoveOutcome, EngineError> {
        require_full(session)?;
        let cred = session.credential().clone();

        let result = async {
            let (item, entries) = self.fetch_acl(&cred, path).await?;
            let targets: Vec<String> = entries
                .iter()
                .filter(|p| !p.is_owner() && p.grants_to(email))
                .map(|p| p.id.clone())
                .collect();

            if targets.is_empty() {
                tracing::info!(path, email, "no grant to remove");
                return Ok(RemoveOutcome::NothingToRemove);
            }

            for id in &targets {
                let outcome = self.delete(&cred, &item.id, id).await?;
                if outcome == DeleteOutcome::AlreadyAbsent {
                    tracing::debug!(permission = %id, "grant vanished before deletion");
                }
            }
            tracing::info!(path, email, count = targets.len(), "removed grants");
            Ok(RemoveOutcome::Removed {
                permission_ids: targets,
            })
        }
        .await;
        result.map_err(|e| reject_or_wrap(session, e))
    }

    /// Delete every explicit, non-owner grant on `path`, including sharing
    /// links. Inherited grants are skipped: they belong to an ancestor and
    /// deleting them here would widen the blast radius past the named item.
    pub async fn strip_explicit(
        &self,
        session: &mut Session,
        path: &str,
    ) -> Result<StripReport, EngineError> {
        require_full(session)?;
        let cred = session.credential().clone();

        let (item, entries) = self
            .fetch_acl(&cred, path)
            .await
            .map_err(|e| reject_or_wrap(session, e))?;

        let mut report = StripReport::default();
        for entry in entries.iter().filter(|p| !p.is_owner() && !p.is_inherited()) {
            match self.delete(&cred, &item.id, &entry.id).await {
                Ok(DeleteOutcome::Removed) => report.removed.push(entry.id.clone()),
                Ok(DeleteOutcome::AlreadyAbsent) => report.already_absent.push(entry.id.clone()),
                Err(GraphError::Unauthorized) => {
                    reject_credential(session);
                    report.aborted = true;
                    break;
                }
                Err(error) => {
                    tracing::warn!(permission = %entry.id, %error, "failed to delete grant");
                    report.failures.push(StripFailure {
                        permission_id: entry.id.clone(),
                        error,
                    });
                }
            }
        }
        tracing::info!(
            path,
            removed = report.removed.len(),
            failed = report.failures.len(),
            aborted = report.aborted,
            "strip finished"
        );
        Ok(report)
    }

    /// Remove `email` from every path in `paths`, one item at a time.
    ///
    /// Sequential on purpose: the throttling budget is shared across the
    /// whole drive, and a parallel fan-out just converts it into a wall of
    /// 429s. Per-path failures are recorded and the run continues; only a
    /// rejected credential aborts it.
    pub async fn bulk_remove_user(
        &self,
        session: &mut Session,
        paths: &[String],
        email: &str,
    ) -> Result<BulkRemoveReport, EngineError> {
        require_full(session)?;
        let cred = session.credential().clone();

        let mut report = BulkRemoveReport::default();
        for path in paths {
            match self.remove_on_item(&cred, path, email).await {
                Ok(RemoveOutcome::Removed { .. }) => report.removed.push(path.clone()),
                Ok(RemoveOutcome::NothingToRemove) => report.no_grant.push(path.clone()),
                Err(GraphError::NotFound { .. }) => report.not_found.push(path.clone()),
                Err(GraphError::Unauthorized) => {
                    reject_credential(session);
                    report.aborted = true;
                    break;
                }
                Err(error) => {
                    tracing::warn!(path, %error, "bulk removal failed for path");
                    report.failures.push(BulkFailure {
                        path: path.clone(),
                        error,
                    });
                }
            }
        }
        tracing::info!(
            email,
            removed = report.removed.len(),
            no_grant = report.no_grant.len(),
            not_found = report.not_found.len(),
            failed = report.failures.len(),
            aborted = report.aborted,
            "bulk removal finished"
        );
        Ok(report)
    }

    async fn remove_on_item(
        &self,
        cred: &Credential,
        path: &str,
        email: &str,
    ) -> Result<RemoveOutcome, GraphError> {
        let (item, entries) = self.fetch_acl(cred, path).await?;
        let targets: Vec<String> = entries
            .iter()
            .filter(|p| !p.is_owner() && p.grants_to(email))
            .map(|p| p.id.clone())
            .collect();

        if targets.is_empty() {
            return Ok(RemoveOutcome::NothingToRemove);
        }
        for id in &targets {
            self.delete(cred, &item.id, id).await?;
        }
        Ok(RemoveOutcome::Removed {
            permission_ids: targets,
        })
    }

    async fn resolve(&self, cred: &Credential, path: &str) -> Result<ItemRef, GraphError> {
        retry("resolve", GraphError::is_retryable, || {
            self.api.resolve_item(cred, path)
        })
        .await
    }

    async fn fetch_acl(
        &self,
        cred: &Credential,
        path: &str,
    ) -> Result<(ItemRef, Vec<PermissionEntry>), GraphError> {
        let item = self.resolve(cred, path).await?;
        let entries = retry("list_permissions", GraphError::is_retryable, || {
            self.api.list_permissions(cred, &item.id)
        })
        .await?;
        Ok((item, entries))
    }

    async fn delete(
        &self,
        cred: &Credential,
        item_id: &str,
        permission_id: &str,
    ) -> Result<DeleteOutcome, GraphError> {
        retry("delete_permission", GraphError::is_retryable, || {
            self.api.delete_permission(cred, item_id, permission_id)
        })
        .await
    }
}

/// Local gate in front of every mutation. No request leaves the machine when
/// the active credential cannot possibly satisfy it.
fn require_full(session: &Session) -> Result<(), EngineError> {
    match session.capability() {
        CapabilityLevel::Full => Ok(()),
        level => Err(EngineError::InsufficientCapability { level }),
    }
}

/// Map a terminal call failure, reacting to a rejected credential by
/// demoting the session to its fallback.
fn reject_or_wrap(session: &mut Session, err: GraphError) -> EngineError {
    if matches!(err, GraphError::Unauthorized) {
        reject_credential(session);
        EngineError::CredentialExpired
    } else {
        EngineError::Graph(err)
    }
}

fn reject_credential(session: &mut Session) {
    if let Err(error) = session.handle_unauthorized() {
        tracing::warn!(%error, "could not swap in the fallback credential");
    }
}

/// Bounded retry of a remote call. Throttled calls wait out the server's
/// hint; transient server failures wait a short fixed delay. Which error
/// kinds are retried at all is the caller's choice.
async fn retry<T, F, Fut>(
    operation: &'static str,
    retryable: fn(&GraphError) -> bool,
    mut call: F,
) -> Result<T, GraphError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, GraphError>>,
{
    let mut attempt = 1u32;
    loop {
        match call().await {
            Err(err) if retryable(&err) && attempt < MAX_RETRY_ATTEMPTS => {
                let delay = match &err {
                    GraphError::RateLimited { retry_after } => *retry_after,
                    _ => TRANSIENT_RETRY_DELAY,
                };
                tracing::warn!(
                    operation,
                    attempt,
                    delay_secs = delay.as_secs(),
                    error = %err,
                    "transient failure, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            outcome => return outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, VecDeque};
    use std::fs;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::Utc;
    use tempfile::TempDir;

    use crate::credential::{CredentialStore, Provenance};
    use crate::graph::DriveItem;

    /// In-memory ACL backend with per-method error injection.
    #[derive(Default)]
    struct MockApi {
        items: HashMap<String, String>,
        perms: Mutex<HashMap<String, Vec<serde_json::Value>>>,
        invite_errors: Mutex<VecDeque<GraphError>>,
        delete_errors: Mutex<VecDeque<GraphError>>,
        calls: Mutex<Vec<String>>,
        invite_seq: AtomicU32,
    }

    impl MockApi {
        fn with_item(mut self, path: &str, id: &str, perms: Vec<serde_json::Value>) -> Self {
            self.items.insert(path.to_string(), id.to_string());
            self.perms.lock().unwrap().insert(id.to_string(), perms);
            self
        }

        fn fail_delete(self, err: GraphError) -> Self {
            self.delete_errors.lock().unwrap().push_back(err);
            self
        }

        fn fail_invite(self, err: GraphError) -> Self {
            self.invite_errors.lock().unwrap().push_back(err);
            self
        }

        fn calls_named(&self, prefix: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|c| c.starts_with(prefix))
                .count()
        }
    }

    #[async_trait]
    impl AclApi for MockApi {
        async fn resolve_item(
            &self,
            _cred: &Credential,
            path: &str,
        ) -> Result<ItemRef, GraphError> {
            self.calls.lock().unwrap().push(format!("resolve:{path}"));
            match self.items.get(path) {
                Some(id) => Ok(ItemRef {
                    id: id.clone(),
                    path: path.to_string(),
                }),
                None => Err(GraphError::NotFound {
                    resource: path.to_string(),
                }),
            }
        }

        async fn list_permissions(
            &self,
            _cred: &Credential,
            item_id: &str,
        ) -> Result<Vec<PermissionEntry>, GraphError> {
            self.calls.lock().unwrap().push(format!("list:{item_id}"));
            let perms = self.perms.lock().unwrap();
            let entries = perms.get(item_id).cloned().unwrap_or_default();
            Ok(entries
                .into_iter()
                .map(|v| serde_json::from_value(v).unwrap())
                .collect())
        }

        async fn invite(
            &self,
            _cred: &Credential,
            item_id: &str,
            email: &str,
            role: InviteRole,
        ) -> Result<Vec<PermissionEntry>, GraphError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("invite:{item_id}:{email}"));
            if let Some(err) = self.invite_errors.lock().unwrap().pop_front() {
                return Err(err);
            }
            let n = self.invite_seq.fetch_add(1, Ordering::SeqCst);
            let entry = serde_json::json!({
                "id": format!("inv-{n}"),
                "roles": [role.as_str()],
                "grantedTo": {"user": {"email": email}}
            });
            self.perms
                .lock()
                .unwrap()
                .entry(item_id.to_string())
                .or_default()
                .push(entry.clone());
            Ok(vec![serde_json::from_value(entry).unwrap()])
        }

        async fn delete_permission(
            &self,
            _cred: &Credential,
            item_id: &str,
            permission_id: &str,
        ) -> Result<DeleteOutcome, GraphError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("delete:{item_id}:{permission_id}"));
            if let Some(err) = self.delete_errors.lock().unwrap().pop_front() {
                return Err(err);
            }
            let mut perms = self.perms.lock().unwrap();
            let entries = perms.entry(item_id.to_string()).or_default();
            let before = entries.len();
            entries.retain(|e| e["id"] != permission_id);
            if entries.len() < before {
                Ok(DeleteOutcome::Removed)
            } else {
                Ok(DeleteOutcome::AlreadyAbsent)
            }
        }

        async fn list_children(
            &self,
            _cred: &Credential,
            _item_id: Option<&str>,
        ) -> Result<Vec<DriveItem>, GraphError> {
            Ok(Vec::new())
        }
    }

    fn owner_entry(id: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "roles": ["owner"],
            "grantedTo": {"user": {"email": "me@example.com"}}
        })
    }

    fn write_entry(id: &str, email: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "roles": ["write"],
            "grantedTo": {"user": {"email": email}}
        })
    }

    fn inherited_entry(id: &str, email: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "roles": ["read"],
            "grantedTo": {"user": {"email": email}},
            "inheritedFrom": {"id": "PARENT"}
        })
    }

    fn session_with(dir: &TempDir, provenance: Provenance) -> Session {
        fs::write(
            dir.path().join("rclone.conf"),
            concat!(
                "[OneDrive]\n",
                r#"token = {"access_token":"fallback-tok","expiry":"2030-01-01T00:00:00Z"}"#,
                "\n",
            ),
        )
        .unwrap();
        let store = CredentialStore::from_paths(
            dir.path().join("token.json"),
            dir.path().join("rclone.conf"),
        );
        let cred = Credential {
            access_token: "tok".to_string(),
            token_type: "Bearer".to_string(),
            expires_at: Some(Utc::now() + chrono::Duration::hours(1)),
            scope: match provenance {
                Provenance::LocalElevated => {
                    Some("Files.ReadWrite.All Sites.Manage.All".to_string())
                }
                Provenance::FallbackStandard => None,
            },
            refresh_token: None,
            drive_id: None,
            provenance,
        };
        if provenance == Provenance::LocalElevated {
            store.save(&cred).unwrap();
        }
        Session::with_credential(store, "OneDrive", cred)
    }

    #[tokio::test]
    async fn fallback_credential_is_gated_before_any_request() {
        let dir = TempDir::new().unwrap();
        let mut session = session_with(&dir, Provenance::FallbackStandard);
        let engine = AclEngine::new(MockApi::default().with_item("/doc", "i1", vec![]));

        let err = engine
            .invite(&mut session, "/doc", "bob@example.com", InviteRole::Write)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InsufficientCapability { .. }));
        assert!(err.to_string().contains("driveacl auth"));
        assert!(engine.api().calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_acl_works_read_only() {
        let dir = TempDir::new().unwrap();
        let mut session = session_with(&dir, Provenance::FallbackStandard);
        let engine = AclEngine::new(MockApi::default().with_item(
            "/doc",
            "i1",
            vec![owner_entry("p0"), write_entry("p1", "bob@example.com")],
        ));

        let (item, entries) = engine.list_acl(&mut session, "/doc").await.unwrap();
        assert_eq!(item.id, "i1");
        assert_eq!(entries.len(), 2);
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let mut session = session_with(&dir, Provenance::LocalElevated);
        let engine = AclEngine::new(MockApi::default().with_item(
            "/doc",
            "i1",
            vec![owner_entry("p0"), write_entry("p1", "Bob@Example.com")],
        ));

        let first = engine
            .remove_by_email(&mut session, "/doc", "bob@example.com")
            .await
            .unwrap();
        assert_eq!(
            first,
            RemoveOutcome::Removed {
                permission_ids: vec!["p1".to_string()]
            }
        );

        let second = engine
            .remove_by_email(&mut session, "/doc", "bob@example.com")
            .await
            .unwrap();
        assert_eq!(second, RemoveOutcome::NothingToRemove);
    }

    #[tokio::test]
    async fn remove_never_targets_owner_grants() {
        let dir = TempDir::new().unwrap();
        let mut session = session_with(&dir, Provenance::LocalElevated);
        let engine = AclEngine::new(
            MockApi::default().with_item("/doc", "i1", vec![owner_entry("p0")]),
        );

        let outcome = engine
            .remove_by_email(&mut session, "/doc", "me@example.com")
            .await
            .unwrap();
        assert_eq!(outcome, RemoveOutcome::NothingToRemove);
        assert_eq!(engine.api().calls_named("delete:"), 0);
    }

    #[tokio::test]
    async fn strip_deletes_only_explicit_non_owner_grants() {
        let dir = TempDir::new().unwrap();
        let mut session = session_with(&dir, Provenance::LocalElevated);
        let engine = AclEngine::new(MockApi::default().with_item(
            "/folder",
            "i1",
            vec![
                owner_entry("p0"),
                write_entry("p1", "bob@example.com"),
                inherited_entry("p2", "carol@example.com"),
            ],
        ));

        let report = engine.strip_explicit(&mut session, "/folder").await.unwrap();
        assert_eq!(report.removed, ["p1"]);
        assert!(report.is_clean());
        assert_eq!(engine.api().calls_named("delete:"), 1);
    }

    #[tokio::test]
    async fn strip_continues_past_individual_failures() {
        let dir = TempDir::new().unwrap();
        let mut session = session_with(&dir, Provenance::LocalElevated);
        let engine = AclEngine::new(
            MockApi::default()
                .with_item(
                    "/folder",
                    "i1",
                    vec![
                        write_entry("p1", "bob@example.com"),
                        write_entry("p2", "carol@example.com"),
                    ],
                )
                .fail_delete(GraphError::AccessDenied {
                    detail: "locked".to_string(),
                }),
        );

        let report = engine.strip_explicit(&mut session, "/folder").await.unwrap();
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].permission_id, "p1");
        assert_eq!(report.removed, ["p2"]);
        assert!(!report.aborted);
    }

    #[tokio::test(start_paused = true)]
    async fn throttled_delete_waits_out_the_server_hint() {
        let dir = TempDir::new().unwrap();
        let mut session = session_with(&dir, Provenance::LocalElevated);
        let engine = AclEngine::new(
            MockApi::default()
                .with_item("/doc", "i1", vec![write_entry("p1", "bob@example.com")])
                .fail_delete(GraphError::RateLimited {
                    retry_after: Duration::from_secs(2),
                }),
        );

        let started = tokio::time::Instant::now();
        let outcome = engine
            .remove_by_email(&mut session, "/doc", "bob@example.com")
            .await
            .unwrap();
        assert!(matches!(outcome, RemoveOutcome::Removed { .. }));
        assert!(started.elapsed() >= Duration::from_secs(2));
        assert_eq!(engine.api().calls_named("delete:"), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn throttled_invite_is_retried() {
        let dir = TempDir::new().unwrap();
        let mut session = session_with(&dir, Provenance::LocalElevated);
        let engine = AclEngine::new(
            MockApi::default()
                .with_item("/doc", "i1", vec![])
                .fail_invite(GraphError::RateLimited {
                    retry_after: Duration::from_secs(1),
                }),
        );

        let receipt = engine
            .invite(&mut session, "/doc", "bob@example.com", InviteRole::Read)
            .await
            .unwrap();
        assert_eq!(receipt.granted.len(), 1);
        assert_eq!(engine.api().calls_named("invite:"), 2);
    }

    #[tokio::test]
    async fn transient_invite_failure_is_not_retried() {
        // A 5xx invite may have executed; retrying would double-notify.
        let dir = TempDir::new().unwrap();
        let mut session = session_with(&dir, Provenance::LocalElevated);
        let engine = AclEngine::new(
            MockApi::default()
                .with_item("/doc", "i1", vec![])
                .fail_invite(GraphError::TransientServer {
                    status: 503,
                    detail: "unavailable".to_string(),
                }),
        );

        let err = engine
            .invite(&mut session, "/doc", "bob@example.com", InviteRole::Write)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Graph(GraphError::TransientServer { .. })
        ));
        assert_eq!(engine.api().calls_named("invite:"), 1);
    }

    #[tokio::test]
    async fn rejected_credential_demotes_the_session() {
        let dir = TempDir::new().unwrap();
        let mut session = session_with(&dir, Provenance::LocalElevated);
        let engine = AclEngine::new(
            MockApi::default()
                .with_item("/doc", "i1", vec![write_entry("p1", "bob@example.com")])
                .fail_delete(GraphError::Unauthorized),
        );

        let err = engine
            .remove_by_email(&mut session, "/doc", "bob@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::CredentialExpired));
        assert_eq!(session.capability(), CapabilityLevel::ReadOnly);
        assert!(!session.store().token_path().exists());
    }

    #[tokio::test]
    async fn bulk_remove_reports_each_path() {
        let dir = TempDir::new().unwrap();
        let mut session = session_with(&dir, Provenance::LocalElevated);
        let engine = AclEngine::new(
            MockApi::default()
                .with_item("/a", "ia", vec![write_entry("p1", "bob@example.com")])
                .with_item("/c", "ic", vec![owner_entry("p0")]),
        );

        let paths: Vec<String> = ["/a", "/missing", "/c"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let report = engine
            .bulk_remove_user(&mut session, &paths, "bob@example.com")
            .await
            .unwrap();
        assert_eq!(report.removed, ["/a"]);
        assert_eq!(report.not_found, ["/missing"]);
        assert_eq!(report.no_grant, ["/c"]);
        assert!(report.failures.is_empty());
        assert!(!report.aborted);
    }

    #[tokio::test]
    async fn bulk_remove_aborts_on_rejected_credential() {
        let dir = TempDir::new().unwrap();
        let mut session = session_with(&dir, Provenance::LocalElevated);
        let engine = AclEngine::new(
            MockApi::default()
                .with_item("/a", "ia", vec![write_entry("p1", "bob@example.com")])
                .with_item("/b", "ib", vec![write_entry("p2", "bob@example.com")])
                .fail_delete(GraphError::Unauthorized),
        );

        let paths: Vec<String> = ["/a", "/b"].iter().map(|s| s.to_string()).collect();
        let report = engine
            .bulk_remove_user(&mut session, &paths, "bob@example.com")
            .await
            .unwrap();
        assert!(report.aborted);
        assert!(report.removed.is_empty());
        assert_eq!(session.capability(), CapabilityLevel::ReadOnly);
        // "/b" was never attempted.
        assert_eq!(engine.api().calls_named("resolve:/b"), 0);
    }
}
