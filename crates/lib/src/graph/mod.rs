//! Remote ACL API: request/response wrappers over Microsoft Graph.
//!
//! [`GraphClient`] is the production implementation; the [`AclApi`] trait is
//! the seam the engine and scanner are written against, so tests can swap in
//! an in-memory fake.

mod client;
mod errors;
mod types;

pub use client::GraphClient;
pub use errors::GraphError;
pub use types::{
    DeleteOutcome, DriveItem, Identity, IdentitySet, InviteRole, ItemRef, PermissionEntry, Role,
    SharedFacet, SharingLink,
};

use async_trait::async_trait;

use crate::credential::Credential;

/// The remote ACL operations the rest of the crate consumes.
///
/// Implementations are stateless request wrappers; retry, gating, and
/// credential fallback are the engine's concern.
#[async_trait]
pub trait AclApi: Send + Sync {
    /// Resolve a drive path to an item snapshot.
    async fn resolve_item(
        &self,
        credential: &Credential,
        path: &str,
    ) -> Result<ItemRef, GraphError>;

    /// List the full ACL of an item.
    async fn list_permissions(
        &self,
        credential: &Credential,
        item_id: &str,
    ) -> Result<Vec<PermissionEntry>, GraphError>;

    /// Create a permission by inviting a recipient email.
    async fn invite(
        &self,
        credential: &Credential,
        item_id: &str,
        email: &str,
        role: InviteRole,
    ) -> Result<Vec<PermissionEntry>, GraphError>;

    /// Delete a permission by id. A missing permission is a benign
    /// [`DeleteOutcome::AlreadyAbsent`], not an error.
    async fn delete_permission(
        &self,
        credential: &Credential,
        item_id: &str,
        permission_id: &str,
    ) -> Result<DeleteOutcome, GraphError>;

    /// List the children of an item (`None` for the drive root).
    async fn list_children(
        &self,
        credential: &Credential,
        item_id: Option<&str>,
    ) -> Result<Vec<DriveItem>, GraphError>;
}
