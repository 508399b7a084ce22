//! Resolved metadata for one remote file.

use serde::{Deserialize, Serialize};

/// MIME type reported when the origin sends no `Content-Type`.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Display metadata for a remote file, as returned by the `info` action.
///
/// Built fresh on every resolution; two resolutions of the same URL may
/// differ if the origin's headers change in between.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    pub name: String,
    /// Byte length, `0` when the origin did not report one.
    pub size: u64,
    #[serde(rename = "type")]
    pub content_type: String,
    pub url: String,
}

impl FileInfo {
    /// Size for a `Content-Length` header; `None` when unknown.
    pub fn known_size(&self) -> Option<u64> {
        (self.size > 0).then_some(self.size)
    }

    /// `attachment; filename="<name>"`. The name is quoted as-is; embedded
    /// quotes are not escaped.
    pub fn attachment_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.name)
    }
}

/// Formats a byte count for humans: `0 Bytes`, `512 Bytes`, `1.5 KB`, `2.25 MB`.
///
/// Base 1024, at most two decimals, trailing zeros dropped.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[unit])
}
