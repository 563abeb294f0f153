//! Core data models for Melon.
//!
//! This crate provides the data types shared across the Melon crates:
//! catalog records returned by the media backend, stored-object lookups,
//! and entries discovered while walking a group's shared files.

pub mod catalog;
mod de;
pub mod file;

// Re-export main types
pub use catalog::{CatalogRecord, FileType, OssListing, OssObject};
pub use file::{
    join_path, FileEntry, FolderListing, RemoteFile, RemoteFolder, PATH_SEPARATOR, ROOT_FOLDER_NAME,
};
