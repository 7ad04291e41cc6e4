//! Stateless request wrappers over the Graph drive-item and permission
//! endpoints.
//!
//! Each call takes a bearer credential and returns a typed payload or a
//! structured [`GraphError`]. No retry logic lives here; every call enforces
//! the fixed request timeout and reports timeouts as their own failure kind.

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use super::errors::GraphError;
use super::types::{DeleteOutcome, DriveItem, InviteRole, ItemRef, PermissionEntry};
use super::AclApi;
use crate::constants::{DEFAULT_RETRY_AFTER, GRAPH_BASE, HTTP_TIMEOUT};
use crate::credential::Credential;

/// Thin `reqwest` wrapper around the remote ACL API.
#[derive(Debug, Clone)]
pub struct GraphClient {
    http: reqwest::Client,
}

#[derive(Deserialize)]
struct ItemEnvelope {
    id: String,
}

#[derive(Deserialize)]
struct PermissionCollection {
    #[serde(default)]
    value: Vec<PermissionEntry>,
}

#[derive(Deserialize)]
struct ChildrenPage {
    #[serde(default)]
    value: Vec<DriveItem>,
    #[serde(default, rename = "@odata.nextLink")]
    next_link: Option<String>,
}

impl GraphClient {
    pub fn new() -> Result<Self, GraphError> {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| GraphError::Network {
                detail: e.to_string(),
            })?;
        Ok(Self { http })
    }

    /// URL addressing an item by drive path, using the `root:/path` colon
    /// form. Each path segment is percent-encoded from its UTF-8 bytes
    /// (space as `%20`), so non-Latin folder names survive intact.
    pub(crate) fn item_by_path_url(path: &str) -> Url {
        let mut url = Url::parse(GRAPH_BASE).expect("static base URL");
        {
            let mut segments = url.path_segments_mut().expect("base URL has a path");
            segments.extend(["me", "drive"]);
            let trimmed = path.trim_matches('/');
            if trimmed.is_empty() {
                segments.push("root");
            } else {
                segments.push("root:");
                segments.extend(trimmed.split('/'));
            }
        }
        url
    }

    /// URL addressing an already-resolved item by id, with optional trailing
    /// segments (`permissions`, `invite`, ...).
    fn item_url(item_id: Option<&str>, tail: &[&str]) -> Url {
        let mut url = Url::parse(GRAPH_BASE).expect("static base URL");
        {
            let mut segments = url.path_segments_mut().expect("base URL has a path");
            segments.extend(["me", "drive"]);
            match item_id {
                Some(id) => {
                    segments.extend(["items", id]);
                }
                None => {
                    segments.push("root");
                }
            }
            segments.extend(tail.iter().copied());
        }
        url
    }

    async fn get(
        &self,
        credential: &Credential,
        url: Url,
        resource: &str,
    ) -> Result<reqwest::Response, GraphError> {
        let response = self
            .http
            .get(url)
            .bearer_auth(&credential.access_token)
            .send()
            .await?;
        ok_or_status(response, resource).await
    }
}

/// Turn a non-success response into the matching [`GraphError`].
async fn error_from_response(response: reqwest::Response, resource: &str) -> GraphError {
    let status = response.status();
    let retry_after = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .map(std::time::Duration::from_secs);
    let body = response.text().await.unwrap_or_default();
    let detail = truncate(&body, 300);

    match status.as_u16() {
        401 => GraphError::Unauthorized,
        403 => GraphError::AccessDenied { detail },
        404 => GraphError::NotFound {
            resource: resource.to_string(),
        },
        429 => GraphError::RateLimited {
            retry_after: retry_after.unwrap_or(DEFAULT_RETRY_AFTER),
        },
        s if s >= 500 => GraphError::TransientServer { status: s, detail },
        s => GraphError::Status { status: s, detail },
    }
}

async fn ok_or_status(
    response: reqwest::Response,
    resource: &str,
) -> Result<reqwest::Response, GraphError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(error_from_response(response, resource).await)
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        let mut end = max;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}…", &s[..end])
    }
}

fn invalid_response(err: reqwest::Error) -> GraphError {
    GraphError::InvalidResponse {
        detail: err.to_string(),
    }
}

#[async_trait]
impl AclApi for GraphClient {
    async fn resolve_item(
        &self,
        credential: &Credential,
        path: &str,
    ) -> Result<ItemRef, GraphError> {
        let url = Self::item_by_path_url(path);
        tracing::debug!(path, "resolving item");
        let response = self.get(credential, url, path).await?;
        let item: ItemEnvelope = response.json().await.map_err(invalid_response)?;
        Ok(ItemRef {
            id: item.id,
            path: path.to_string(),
        })
    }

    async fn list_permissions(
        &self,
        credential: &Credential,
        item_id: &str,
    ) -> Result<Vec<PermissionEntry>, GraphError> {
        let url = Self::item_url(Some(item_id), &["permissions"]);
        let response = self.get(credential, url, item_id).await?;
        let collection: PermissionCollection =
            response.json().await.map_err(invalid_response)?;
        Ok(collection.value)
    }

    async fn invite(
        &self,
        credential: &Credential,
        item_id: &str,
        email: &str,
        role: InviteRole,
    ) -> Result<Vec<PermissionEntry>, GraphError> {
        let url = Self::item_url(Some(item_id), &["invite"]);
        let body = serde_json::json!({
            "requireSignIn": true,
            "roles": [role.as_str()],
            "recipients": [{"email": email}],
            "message": "You have been granted access to this item.",
        });

        let response = self
            .http
            .post(url)
            .bearer_auth(&credential.access_token)
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        let response = ok_or_status(response, item_id).await?;

        // Personal drives answer 200 with a permission collection; business
        // drives answer 201 with a single permission object.
        if status.as_u16() == 201 {
            let single: PermissionEntry = response.json().await.map_err(invalid_response)?;
            Ok(vec![single])
        } else {
            let collection: PermissionCollection =
                response.json().await.map_err(invalid_response)?;
            Ok(collection.value)
        }
    }

    async fn delete_permission(
        &self,
        credential: &Credential,
        item_id: &str,
        permission_id: &str,
    ) -> Result<DeleteOutcome, GraphError> {
        let url = Self::item_url(Some(item_id), &["permissions", permission_id]);
        let response = self
            .http
            .delete(url)
            .bearer_auth(&credential.access_token)
            .send()
            .await?;

        // 404 means the permission is already gone, which is the end state
        // the caller wanted. Concurrent removals race here by design.
        if response.status().as_u16() == 404 {
            return Ok(DeleteOutcome::AlreadyAbsent);
        }
        ok_or_status(response, permission_id).await?;
        Ok(DeleteOutcome::Removed)
    }

    async fn list_children(
        &self,
        credential: &Credential,
        item_id: Option<&str>,
    ) -> Result<Vec<DriveItem>, GraphError> {
        let mut url = Self::item_url(item_id, &["children"]);
        let resource = item_id.unwrap_or("root").to_string();
        let mut items = Vec::new();

        loop {
            let response = self.get(credential, url, &resource).await?;
            let page: ChildrenPage = response.json().await.map_err(invalid_response)?;
            items.extend(page.value);
            match page.next_link.as_deref().and_then(|l| Url::parse(l).ok()) {
                Some(next) => url = next,
                None => break,
            }
        }
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_url_uses_colon_addressing() {
        let url = GraphClient::item_by_path_url("Documents/Project");
        assert_eq!(
            url.as_str(),
            "https://graph.microsoft.com/v1.0/me/drive/root:/Documents/Project"
        );
    }

    #[test]
    fn path_url_percent_encodes_utf8_bytewise() {
        let url = GraphClient::item_by_path_url("Documents/My Folder/日本語");
        assert_eq!(
            url.as_str(),
            "https://graph.microsoft.com/v1.0/me/drive/root:/Documents/My%20Folder/%E6%97%A5%E6%9C%AC%E8%AA%9E"
        );

        let url = GraphClient::item_by_path_url("photos/🦀");
        assert_eq!(
            url.as_str(),
            "https://graph.microsoft.com/v1.0/me/drive/root:/photos/%F0%9F%A6%80"
        );
    }

    #[test]
    fn empty_path_addresses_the_root() {
        let url = GraphClient::item_by_path_url("");
        assert_eq!(url.as_str(), "https://graph.microsoft.com/v1.0/me/drive/root");
    }

    #[test]
    fn item_urls() {
        let url = GraphClient::item_url(Some("ITEM1"), &["permissions", "PERM1"]);
        assert_eq!(
            url.as_str(),
            "https://graph.microsoft.com/v1.0/me/drive/items/ITEM1/permissions/PERM1"
        );

        let url = GraphClient::item_url(None, &["children"]);
        assert_eq!(
            url.as_str(),
            "https://graph.microsoft.com/v1.0/me/drive/root/children"
        );
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let s = "ααααα";
        let t = truncate(s, 3);
        assert!(t.starts_with('α'));
    }
}
