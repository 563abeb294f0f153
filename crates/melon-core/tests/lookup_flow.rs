//! Integration tests for the shared-file lookup path.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use melon_core::{find, Detail, DetailResolver, FileLookup, MelonError, RemoteFileStore, RemoteTreeWalker};
use melon_core::{CatalogApi, Result};
use melon_models::{CatalogRecord, FolderListing, OssObject, RemoteFile, RemoteFolder};

/// A three-level tree: root -> Movies -> 2024, plus a Packs folder.
struct LibraryStore {
    folders: HashMap<&'static str, FolderListing>,
}

fn file(name: &str) -> RemoteFile {
    RemoteFile {
        file_id: format!("id-{name}"),
        file_name: name.to_string(),
        size: 1024,
    }
}

fn folder(id: &str, name: &str) -> RemoteFolder {
    RemoteFolder {
        folder_id: Some(id.to_string()),
        folder_name: name.to_string(),
    }
}

impl LibraryStore {
    fn new() -> Self {
        let mut folders = HashMap::new();
        folders.insert(
            "/",
            FolderListing {
                files: vec![file("readme.txt")],
                folders: vec![folder("movies", "Movies"), folder("packs", "Packs")],
            },
        );
        folders.insert(
            "movies",
            FolderListing {
                files: vec![],
                folders: vec![folder("y2024", "2024")],
            },
        );
        folders.insert(
            "y2024",
            FolderListing {
                files: vec![file("a.mp4")],
                folders: vec![],
            },
        );
        folders.insert(
            "packs",
            FolderListing {
                files: vec![file("X0011.zip"), file("X001.zip")],
                folders: vec![],
            },
        );
        Self { folders }
    }
}

#[async_trait]
impl RemoteFileStore for LibraryStore {
    async fn list_root(&self, _group_id: i64) -> Result<FolderListing> {
        Ok(self.folders["/"].clone())
    }

    async fn list_folder(&self, _group_id: i64, folder_id: &str) -> Result<FolderListing> {
        self.folders
            .get(folder_id)
            .cloned()
            .ok_or_else(|| MelonError::FileStore(format!("unknown folder {folder_id}")))
    }
}

/// Catalog that must never be asked anything.
struct UnusedCatalog;

#[async_trait]
impl CatalogApi for UnusedCatalog {
    async fn search(&self, _keyword: &str) -> Result<Vec<CatalogRecord>> {
        unreachable!("search")
    }

    async fn updated_between(
        &self,
        _start: chrono::NaiveDateTime,
        _end: chrono::NaiveDateTime,
    ) -> Result<Vec<CatalogRecord>> {
        unreachable!("updated_between")
    }

    async fn query(&self, _code: &str) -> Result<Option<CatalogRecord>> {
        unreachable!("query")
    }

    async fn oss_objects(&self, _ids: &str) -> Result<Vec<OssObject>> {
        unreachable!("oss_objects")
    }
}

#[tokio::test]
async fn test_walk_reconstructs_paths() {
    let walker = RemoteTreeWalker::new(Arc::new(LibraryStore::new()));
    let entries = walker.enumerate(42).await;

    let paths: Vec<&str> = entries.iter().map(|e| e.relative_path.as_str()).collect();
    assert_eq!(
        paths,
        vec!["readme.txt", "Packs/X0011.zip", "Packs/X001.zip", "Movies/2024/a.mp4"]
    );

    let movie = entries.iter().find(|e| e.file_name == "a.mp4").unwrap();
    assert_eq!(movie.parent_folder_name, "Movies/2024");

    assert_eq!(find("X001", &entries).unwrap().file_name, "X001.zip");
    assert!(find("X00", &entries).is_none());
}

#[tokio::test]
async fn test_shared_file_short_circuits_catalog() {
    let lookup = FileLookup::new(Arc::new(LibraryStore::new()), 42);
    let resolver = DetailResolver::new(Arc::new(UnusedCatalog), Some(lookup));

    match resolver.resolve("a").await.unwrap() {
        Detail::SharedFile(entry) => assert_eq!(entry.relative_path, "Movies/2024/a.mp4"),
        other => panic!("expected a shared file, got {other:?}"),
    }
}
