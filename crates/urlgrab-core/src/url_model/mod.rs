//! URL modeling and filename derivation.
//!
//! Derives the display filename the relay reports for a URL, and the safe
//! local filename the client saves a relayed download under.

mod content_disposition;
mod mime;
mod path;
mod sanitize;

pub use content_disposition::parse_content_disposition_filename;
pub use mime::extension_for_mime;
pub use path::filename_from_url_path;
pub use sanitize::sanitize_filename_for_linux;

use url::Url;

/// Display name used when neither Content-Disposition nor the URL path yields one.
pub const FALLBACK_DISPLAY_NAME: &str = "downloaded-file";

/// Local filename used when the relay's Content-Disposition yields nothing usable.
const DEFAULT_LOCAL_FILENAME: &str = "download.bin";

/// Derives the display filename for a resource.
///
/// Prefers the filename from `content_disposition`, used exactly as sent.
/// Otherwise takes the final URL path segment (or `downloaded-file`), and
/// when that name has no `.` appends the extension mapped from
/// `content_type`, if any.
///
/// # Examples
///
/// - `derive_filename("https://example.com/x", Some("attachment; filename=\"report.pdf\""), "text/html")` → `"report.pdf"`
/// - `derive_filename("https://example.com/data", None, "application/json")` → `"data.json"`
pub fn derive_filename(url: &str, content_disposition: Option<&str>, content_type: &str) -> String {
    if let Some(name) = content_disposition.and_then(parse_content_disposition_filename) {
        return name;
    }

    let mut name =
        filename_from_url_path(url).unwrap_or_else(|| FALLBACK_DISPLAY_NAME.to_string());
    if !name.contains('.') {
        if let Some(ext) = extension_for_mime(content_type) {
            name.push_str(ext);
        }
    }
    name
}

/// Derives a safe filename for saving a relayed download locally.
///
/// Uses the filename from the relay's Content-Disposition, sanitized for
/// Linux; falls back to `download.bin`.
pub fn local_filename(content_disposition: Option<&str>) -> String {
    let raw = match content_disposition.and_then(parse_content_disposition_filename) {
        Some(c) => c,
        None => return DEFAULT_LOCAL_FILENAME.to_string(),
    };

    let sanitized = sanitize_filename_for_linux(&raw);
    if sanitized.is_empty() || sanitized == "." || sanitized == ".." {
        DEFAULT_LOCAL_FILENAME.to_string()
    } else {
        sanitized
    }
}

/// Parses `input` and accepts it only if the scheme is `http` or `https`.
pub fn parse_http_url(input: &str) -> Option<Url> {
    let parsed = Url::parse(input).ok()?;
    matches!(parsed.scheme(), "http" | "https").then_some(parsed)
}

/// True if `input` is a well-formed `http`/`https` URL.
pub fn is_valid_url(input: &str) -> bool {
    parse_http_url(input).is_some()
}
