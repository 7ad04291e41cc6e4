//! Wire types for the Graph drive-item and permission resources.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Snapshot of a resolved drive item.
///
/// The id is authoritative for every subsequent call; the path is kept for
/// display only and is not guaranteed to re-resolve to the same id if the
/// item moves mid-operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRef {
    /// Opaque item id.
    pub id: String,
    /// The path the id was resolved from.
    pub path: String,
}

/// A role carried by a permission entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Write,
    Read,
    /// Any role string this tool does not model.
    #[serde(other)]
    Unknown,
}

/// The role requested when creating a permission. Owner is deliberately not
/// representable here: an ACL editor must never grant ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InviteRole {
    Write,
    Read,
}

impl InviteRole {
    pub fn as_str(self) -> &'static str {
        match self {
            InviteRole::Write => "write",
            InviteRole::Read => "read",
        }
    }
}

/// A user identity attached to a permission grant.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentitySet {
    #[serde(default)]
    pub user: Option<Identity>,
}

/// Sharing-link facet of a permission, when the grant is a link rather than
/// a direct user grant.
#[derive(Debug, Clone, Deserialize)]
pub struct SharingLink {
    #[serde(default, rename = "type")]
    pub link_type: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default, rename = "webUrl")]
    pub web_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ItemReference {
    #[serde(default)]
    id: Option<String>,
}

/// One grant in an item's ACL, as returned by the permissions endpoints.
///
/// Entries are ephemeral: fetched fresh before every mutation decision, never
/// cached across mutating calls.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionEntry {
    /// Opaque permission id, unique within the item.
    pub id: String,

    #[serde(default)]
    pub roles: Vec<Role>,

    /// Grantee as reported by personal drives.
    #[serde(default)]
    granted_to: Option<IdentitySet>,

    /// Grantees as reported by business drives.
    #[serde(default)]
    granted_to_identities: Vec<IdentitySet>,

    #[serde(default)]
    pub link: Option<SharingLink>,

    /// Present when the grant is propagated from a parent folder.
    #[serde(default)]
    inherited_from: Option<ItemReference>,

    #[serde(default, rename = "expirationDateTime")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl PermissionEntry {
    /// Owner grants must never be removal targets.
    pub fn is_owner(&self) -> bool {
        self.roles.contains(&Role::Owner)
    }

    /// Inherited grants are excluded from strip-explicit operations.
    pub fn is_inherited(&self) -> bool {
        self.inherited_from.is_some()
    }

    /// Id of the ancestor item this grant is inherited from, if any.
    pub fn inherited_from_id(&self) -> Option<&str> {
        self.inherited_from.as_ref().and_then(|r| r.id.as_deref())
    }

    /// Every identity attached to this grant, across the personal and
    /// business representations.
    pub fn identities(&self) -> impl Iterator<Item = &Identity> {
        self.granted_to
            .iter()
            .chain(self.granted_to_identities.iter())
            .filter_map(|set| set.user.as_ref())
    }

    /// Every grantee email on this entry.
    pub fn grantee_emails(&self) -> impl Iterator<Item = &str> {
        self.identities().filter_map(|id| id.email.as_deref())
    }

    /// Case-insensitive match against any grantee email.
    pub fn grants_to(&self, email: &str) -> bool {
        self.grantee_emails()
            .any(|candidate| candidate.eq_ignore_ascii_case(email))
    }
}

/// Outcome of a permission deletion. A 404 is benign: the desired end state
/// (permission absent) is already achieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Removed,
    AlreadyAbsent,
}

/// A drive item as returned by children listings.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    folder: Option<serde_json::Value>,
    #[serde(default)]
    shared: Option<SharedFacet>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SharedFacet {
    #[serde(default)]
    pub scope: Option<String>,
}

impl DriveItem {
    pub fn is_folder(&self) -> bool {
        self.folder.is_some()
    }

    /// True when the item carries a `shared` facet.
    pub fn is_shared(&self) -> bool {
        self.shared.is_some()
    }

    /// The sharing scope reported by the `shared` facet, e.g. `users` or
    /// `anonymous`.
    pub fn shared_scope(&self) -> Option<&str> {
        self.shared.as_ref().and_then(|s| s.scope.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(json: serde_json::Value) -> PermissionEntry {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn parses_personal_and_business_grantees() {
        let perm = entry(serde_json::json!({
            "id": "p1",
            "roles": ["write"],
            "grantedTo": {"user": {"email": "One@Example.com", "displayName": "One"}},
            "grantedToIdentities": [
                {"user": {"email": "two@example.com", "id": "u2"}},
                {"user": {"displayName": "no-email"}}
            ]
        }));

        let emails: Vec<&str> = perm.grantee_emails().collect();
        assert_eq!(emails, ["One@Example.com", "two@example.com"]);
        assert!(perm.grants_to("one@example.COM"));
        assert!(!perm.grants_to("three@example.com"));
    }

    #[test]
    fn owner_and_inheritance_flags() {
        let owner = entry(serde_json::json!({"id": "p1", "roles": ["owner"]}));
        assert!(owner.is_owner());
        assert!(!owner.is_inherited());

        let inherited = entry(serde_json::json!({
            "id": "p2",
            "roles": ["read"],
            "inheritedFrom": {"id": "PARENT"}
        }));
        assert!(inherited.is_inherited());
        assert_eq!(inherited.inherited_from_id(), Some("PARENT"));
    }

    #[test]
    fn unmodeled_roles_do_not_fail_parsing() {
        let perm = entry(serde_json::json!({
            "id": "p1",
            "roles": ["sp.full control", "read"]
        }));
        assert_eq!(perm.roles, [Role::Unknown, Role::Read]);
        assert!(!perm.is_owner());
    }

    #[test]
    fn link_permission_shape() {
        let perm = entry(serde_json::json!({
            "id": "p1",
            "roles": ["read"],
            "link": {"type": "view", "scope": "anonymous", "webUrl": "https://1drv.ms/x"}
        }));
        let link = perm.link.as_ref().unwrap();
        assert_eq!(link.link_type.as_deref(), Some("view"));
        assert_eq!(link.scope.as_deref(), Some("anonymous"));
    }
}
