//! Plain-text rendering of catalog results.
//!
//! Everything here is pure: records in, display strings out. Transport
//! adapters send the strings as-is.

use melon_models::{CatalogRecord, FileEntry};

/// Footer line pointing at the detail command.
pub const DETAIL_HINT: &str = "Send /cid <code> for details.";

/// Footer line about archive passwords, which are shared out of band.
pub const PASSWORD_HINT: &str = "Archive passwords are posted in the group announcement.";

/// Shown when a record has no `fileType`.
pub const UNKNOWN_TYPE: &str = "Unknown type";

/// Shown when a record has no `netdiskType`.
pub const UNKNOWN_DRIVE: &str = "Unknown drive";

/// Shown when a record has no `netdiskUrl`.
pub const NO_LINK: &str = "No link";

/// Format of the per-item update time in digests.
const DIGEST_TIME_FORMAT: &str = "%m-%d %H:%M";

/// Render the digest for records updated in the last `window_hours`.
///
/// An empty list renders as a single line.
pub fn format_digest(records: &[CatalogRecord], window_hours: u32) -> String {
    if records.is_empty() {
        return format!("No new items in the last {} hours.", window_hours);
    }

    let mut lines = Vec::with_capacity(records.len() * 2 + 4);
    lines.push(format!(
        "📢 {} new item{} in the last {} hours:",
        records.len(),
        if records.len() == 1 { "" } else { "s" },
        window_hours
    ));
    lines.push(String::new());

    for (index, record) in records.iter().enumerate() {
        lines.push(format!(
            "{}. {} 【{}】{}",
            index + 1,
            record.kind().glyph(),
            record.display_code(),
            record.display_title()
        ));
        // Unrepresentable timestamps just lose their time line.
        if let Some(updated) = record.updated_at() {
            lines.push(format!("   🕒 {}", updated.format(DIGEST_TIME_FORMAT)));
        }
    }

    lines.push(String::new());
    lines.push(DETAIL_HINT.to_string());
    lines.push(PASSWORD_HINT.to_string());
    lines.join("\n")
}

/// Render keyword search results.
pub fn format_search_results(keyword: &str, records: &[CatalogRecord]) -> String {
    if records.is_empty() {
        return format!("No results for 【{}】.", keyword);
    }

    let mut lines = vec![format!("🔍 Results for 【{}】 ({}):", keyword, records.len())];
    for record in records {
        let file_type = record
            .file_type
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(UNKNOWN_TYPE);
        lines.push(format!(
            "【{}】【{}】【{}】",
            record.display_code(),
            file_type,
            record.display_title()
        ));
    }
    lines.push(String::new());
    lines.push(DETAIL_HINT.to_string());
    lines.push(PASSWORD_HINT.to_string());
    lines.join("\n")
}

/// Render the text part of a record's detail view.
pub fn format_detail(record: &CatalogRecord) -> String {
    let drive = record
        .netdisk_type
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or(UNKNOWN_DRIVE);
    let link = record
        .netdisk_url
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or(NO_LINK);
    let title = record.title.as_deref().unwrap_or_default();

    format!("{}\n\nDetails: 【{}】【{}】", title, drive, link)
}

/// Render a shared-file hit.
pub fn format_file_hit(entry: &FileEntry) -> String {
    format!(
        "📦 Already in the group files:\n{}\nFolder: {}\nSize: {}",
        entry.relative_path,
        entry.parent_folder_name,
        format_size(entry.size)
    )
}

/// Human-readable byte count.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}
