//! Detail lookup: shared files first, catalog second.
//!
//! A requested code is first searched for among the group's shared files
//! (`<code>.<ext>`). Only when no file matches is the catalog queried.

use std::sync::Arc;

use melon_models::{CatalogRecord, FileEntry};
use tracing::{debug, info, warn};

use crate::client::CatalogApi;
use crate::error::Result;
use crate::file_store::RemoteFileStore;
use crate::matcher::find_all;
use crate::walker::RemoteTreeWalker;

/// Finds a code among one group's shared files.
#[derive(Clone)]
pub struct FileLookup {
    walker: RemoteTreeWalker,
    group_id: i64,
}

impl FileLookup {
    pub fn new(store: Arc<dyn RemoteFileStore>, group_id: i64) -> Self {
        Self {
            walker: RemoteTreeWalker::new(store),
            group_id,
        }
    }

    pub fn group_id(&self) -> i64 {
        self.group_id
    }

    /// Walk the group's files and return the first whose stem is `key`.
    ///
    /// Several candidates are logged; the first in walk order is used.
    pub async fn locate(&self, key: &str) -> Option<FileEntry> {
        let entries = self.walker.enumerate(self.group_id).await;
        let matches = find_all(key, &entries);

        if matches.len() > 1 {
            let paths: Vec<&str> = matches.iter().map(|e| e.relative_path.as_str()).collect();
            warn!(
                group_id = self.group_id,
                key = %key,
                candidates = ?paths,
                "Several shared files match, using the first"
            );
        }

        debug!(group_id = self.group_id, key = %key, scanned = entries.len(), found = !matches.is_empty(), "Shared file lookup");
        matches.first().map(|entry| (*entry).clone())
    }
}

/// Outcome of a detail lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Detail {
    /// The item already exists in the group's shared files.
    SharedFile(FileEntry),
    /// The catalog knows the item. `cover` is a fetchable URL, if any.
    Record {
        record: CatalogRecord,
        cover: Option<String>,
    },
    /// Neither source knows the code.
    NotFound,
}

/// Resolves a code to a [`Detail`].
#[derive(Clone)]
pub struct DetailResolver {
    api: Arc<dyn CatalogApi>,
    files: Option<FileLookup>,
}

impl DetailResolver {
    /// `files` is `None` when shared-file lookup is not configured.
    pub fn new(api: Arc<dyn CatalogApi>, files: Option<FileLookup>) -> Self {
        Self { api, files }
    }

    pub async fn resolve(&self, code: &str) -> Result<Detail> {
        if let Some(files) = &self.files {
            if let Some(entry) = files.locate(code).await {
                info!(code = %code, path = %entry.relative_path, "Resolved from shared files");
                return Ok(Detail::SharedFile(entry));
            }
        }

        let Some(record) = self.api.query(code).await? else {
            return Ok(Detail::NotFound);
        };
        let cover = self.resolve_cover(&record).await;
        Ok(Detail::Record { record, cover })
    }

    /// `coverUrl` holds either a URL or a stored-object id. Lookup
    /// failures only cost the cover.
    async fn resolve_cover(&self, record: &CatalogRecord) -> Option<String> {
        let raw = record.cover_url.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        if raw.starts_with("http://") || raw.starts_with("https://") {
            return Some(raw.to_string());
        }

        match self.api.oss_objects(raw).await {
            Ok(objects) => objects.into_iter().next().map(|o| o.url),
            Err(e) => {
                warn!(oss_id = %raw, error = %e, "Failed to resolve cover");
                None
            }
        }
    }
}
