//! Matching walked files against a lookup key.
//!
//! A file matches when its name, minus the last extension, equals the key
//! byte for byte. No case folding or trimming is applied here.

use melon_models::FileEntry;

/// First entry whose stem equals `key`, in input order.
pub fn find<'a>(key: &str, entries: &'a [FileEntry]) -> Option<&'a FileEntry> {
    entries.iter().find(|entry| entry.stem() == key)
}

/// Every entry whose stem equals `key`, in input order.
pub fn find_all<'a>(key: &str, entries: &'a [FileEntry]) -> Vec<&'a FileEntry> {
    entries.iter().filter(|entry| entry.stem() == key).collect()
}
