//! Shared-file types.
//!
//! A group's shared storage is a tree of folders. Listing one folder yields a
//! [`FolderListing`]; walking the whole tree flattens it into [`FileEntry`]
//! values carrying the path that led to each file.

use serde::{Deserialize, Serialize};

use crate::de::{opt_string_lenient, size_lenient, string_lenient};

/// Separator used when joining folder names into a relative path.
pub const PATH_SEPARATOR: char = '/';

/// Parent name reported for files that live directly in the root folder.
pub const ROOT_FOLDER_NAME: &str = "root";

/// A file record as returned by a folder listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFile {
    #[serde(default, deserialize_with = "string_lenient")]
    pub file_id: String,
    #[serde(default)]
    pub file_name: String,
    #[serde(default, deserialize_with = "size_lenient")]
    pub size: u64,
}

/// A sub-folder record as returned by a folder listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFolder {
    #[serde(default, deserialize_with = "opt_string_lenient")]
    pub folder_id: Option<String>,
    #[serde(default)]
    pub folder_name: String,
}

/// Contents of one folder. Either list may be absent in the payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderListing {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub files: Vec<RemoteFile>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub folders: Vec<RemoteFolder>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// A file discovered during a tree walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub file_name: String,
    pub file_id: String,
    /// Size in bytes; zero when the listing omitted it.
    pub size: u64,
    /// Path from the root, including the file name.
    pub relative_path: String,
    /// Every path segment except the last, or [`ROOT_FOLDER_NAME`].
    pub parent_folder_name: String,
}

impl FileEntry {
    /// Builds an entry for `file` found in the folder at `folder_path`.
    pub fn from_listing(file: RemoteFile, folder_path: &str) -> Self {
        let relative_path = join_path(folder_path, &file.file_name);
        let parent_folder_name = parent_of(&relative_path);
        Self {
            file_name: file.file_name,
            file_id: file.file_id,
            size: file.size,
            relative_path,
            parent_folder_name,
        }
    }

    /// The file name with its last extension removed.
    ///
    /// A leading dot on its own is not treated as an extension, so
    /// `.hidden` stays `.hidden`.
    pub fn stem(&self) -> &str {
        match self.file_name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => &self.file_name,
        }
    }
}

/// Joins a folder path and a child name with [`PATH_SEPARATOR`].
pub fn join_path(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{base}{PATH_SEPARATOR}{name}")
    }
}

fn parent_of(relative_path: &str) -> String {
    match relative_path.rsplit_once(PATH_SEPARATOR) {
        Some((parent, _)) => parent.to_string(),
        None => ROOT_FOLDER_NAME.to_string(),
    }
}
