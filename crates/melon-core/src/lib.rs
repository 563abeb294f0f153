//! Melon Core - catalog access, shared-file lookup and digest rendering.
//!
//! This crate holds everything the bot does that is not transport:
//!
//! - **client**: The [`CatalogApi`] seam and its reqwest implementation
//! - **config**: Environment-driven settings and env-file loading
//! - **file_store**: The [`RemoteFileStore`] seam and a OneBot gateway client
//! - **walker**: Breadth-first enumeration of shared files
//! - **matcher**: Stem matching of files against a code
//! - **lookup**: Shared-file-first detail resolution
//! - **window**: Trailing update windows
//! - **format**: Plain-text rendering of results and digests

pub mod client;
pub mod config;
pub mod error;
pub mod file_store;
pub mod format;
pub mod lookup;
pub mod matcher;
pub mod walker;
pub mod window;

#[cfg(test)]
mod testing;

pub use client::{CatalogApi, CatalogClient, TIMESTAMP_FORMAT};
pub use config::{FileStoreSettings, PushSettings, Settings};
pub use error::{MelonError, Result};
pub use file_store::{OneBotFileStore, RemoteFileStore};
pub use format::{format_detail, format_digest, format_file_hit, format_search_results, format_size};
pub use lookup::{Detail, DetailResolver, FileLookup};
pub use matcher::{find, find_all};
pub use walker::RemoteTreeWalker;
pub use window::{UpdateWindow, UpdateWindowFetcher};
