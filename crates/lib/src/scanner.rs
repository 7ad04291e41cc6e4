//! Lazy traversal of a drive looking for shared items.
//!
//! The scanner walks folders breadth-first through [`AclApi::list_children`]
//! and yields every item carrying a sharing facet. It is pull-based: no
//! listing request is issued until the caller asks for the next hit, so a
//! caller that stops after N results only pays for the folders visited to
//! find them.

use std::collections::VecDeque;

use crate::credential::Credential;
use crate::graph::{AclApi, GraphError, ItemRef};

/// A shared item found during a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedItem {
    pub item: ItemRef,
    /// Sharing scope from the item's facet, e.g. `users` or `anonymous`.
    pub scope: Option<String>,
    pub is_folder: bool,
}

/// Breadth-first shared-item scanner over an [`AclApi`].
pub struct SharedItemScanner<'a, A: AclApi> {
    api: &'a A,
    credential: Credential,
    /// Folders still to list: item id (`None` for the drive root) plus the
    /// display path accumulated on the way down.
    queue: VecDeque<(Option<String>, String)>,
    /// Hits found while listing a folder but not yet handed out.
    pending: VecDeque<SharedItem>,
    folders_listed: usize,
}

impl<'a, A: AclApi> SharedItemScanner<'a, A> {
    /// Scan the whole drive, starting at its root.
    pub fn new(api: &'a A, credential: Credential) -> Self {
        let mut queue = VecDeque::new();
        queue.push_back((None, String::new()));
        Self {
            api,
            credential,
            queue,
            pending: VecDeque::new(),
            folders_listed: 0,
        }
    }

    /// Scan the subtree under an already-resolved folder.
    pub fn rooted_at(api: &'a A, credential: Credential, root: ItemRef) -> Self {
        let mut queue = VecDeque::new();
        let path = root.path.trim_end_matches('/').to_string();
        queue.push_back((Some(root.id), path));
        Self {
            api,
            credential,
            queue,
            pending: VecDeque::new(),
            folders_listed: 0,
        }
    }

    /// Folders listed so far. Grows as the caller pulls results.
    pub fn folders_listed(&self) -> usize {
        self.folders_listed
    }

    /// The next shared item, or `None` when the traversal is exhausted.
    ///
    /// Shared folders are yielded and still descended into, since children
    /// can carry their own sharing facets.
    pub async fn next(&mut self) -> Result<Option<SharedItem>, GraphError> {
        loop {
            if let Some(hit) = self.pending.pop_front() {
                return Ok(Some(hit));
            }
            let Some((id, path)) = self.queue.pop_front() else {
                return Ok(None);
            };

            let children = self.api.list_children(&self.credential, id.as_deref()).await?;
            self.folders_listed += 1;
            let folder = if path.is_empty() { "/" } else { path.as_str() };
            tracing::debug!(folder, children = children.len(), "listed folder");

            for child in children {
                let child_path = format!("{path}/{}", child.name);
                if child.is_shared() {
                    self.pending.push_back(SharedItem {
                        item: ItemRef {
                            id: child.id.clone(),
                            path: child_path.clone(),
                        },
                        scope: child.shared_scope().map(str::to_string),
                        is_folder: child.is_folder(),
                    });
                }
                if child.is_folder() {
                    self.queue.push_back((Some(child.id), child_path));
                }
            }
        }
    }
}
