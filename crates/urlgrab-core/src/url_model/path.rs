//! Filename extraction from URL path.

/// Returns the final path segment of a URL, as it appears in the URL.
///
/// Returns `None` if the URL cannot be parsed or the final segment is empty
/// (root path, or a path ending in `/`).
pub fn filename_from_url_path(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed.path().rsplit('/').next()?;
    if segment.is_empty() {
        return None;
    }
    Some(segment.to_string())
}
