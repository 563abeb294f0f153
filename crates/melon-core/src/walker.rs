//! Breadth-first enumeration of a group's shared files.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use melon_models::{join_path, FileEntry, ROOT_FOLDER_NAME};
use tracing::{debug, error, warn};

use crate::file_store::{RemoteFileStore, ROOT_FOLDER_ID};

/// A folder waiting to be listed.
#[derive(Debug, Clone)]
struct PendingFolder {
    /// `None` for the root.
    folder_id: Option<String>,
    name: String,
    relative_path: String,
}

/// Flattens a remote folder tree into file entries.
///
/// Listing failures abandon only the affected branch. Folder ids are
/// tracked so a backend that reports a folder twice (or a cycle) cannot
/// make the walk list it again.
#[derive(Clone)]
pub struct RemoteTreeWalker {
    store: Arc<dyn RemoteFileStore>,
}

impl RemoteTreeWalker {
    pub fn new(store: Arc<dyn RemoteFileStore>) -> Self {
        Self { store }
    }

    /// Enumerate every reachable file of `group_id`, in discovery order.
    pub async fn enumerate(&self, group_id: i64) -> Vec<FileEntry> {
        let mut entries = Vec::new();
        let mut visited: HashSet<String> = HashSet::new();
        let mut queue = VecDeque::from([PendingFolder {
            folder_id: None,
            name: ROOT_FOLDER_NAME.to_string(),
            relative_path: String::new(),
        }]);
        visited.insert(ROOT_FOLDER_ID.to_string());

        while let Some(folder) = queue.pop_front() {
            let listing = match folder.folder_id.as_deref() {
                None | Some(ROOT_FOLDER_ID) => self.store.list_root(group_id).await,
                Some(id) => self.store.list_folder(group_id, id).await,
            };

            let listing = match listing {
                Ok(listing) => listing,
                Err(e) => {
                    error!(
                        group_id,
                        folder = %folder.name,
                        error = %e,
                        "Failed to list folder, skipping branch"
                    );
                    continue;
                }
            };

            debug!(
                group_id,
                folder = %folder.name,
                files = listing.files.len(),
                folders = listing.folders.len(),
                "Listed folder"
            );

            entries.extend(
                listing
                    .files
                    .into_iter()
                    .map(|file| FileEntry::from_listing(file, &folder.relative_path)),
            );

            for sub in listing.folders {
                let Some(id) = sub.folder_id.filter(|id| !id.is_empty()) else {
                    continue;
                };
                if !visited.insert(id.clone()) {
                    warn!(group_id, folder_id = %id, "Folder reported more than once, not revisiting");
                    continue;
                }
                queue.push_back(PendingFolder {
                    folder_id: Some(id),
                    relative_path: join_path(&folder.relative_path, &sub.folder_name),
                    name: sub.folder_name,
                });
            }
        }

        entries
    }
}
