//! Linux-safe filename sanitization for saving relayed downloads.

/// Linux NAME_MAX, in bytes.
const NAME_MAX: usize = 255;

/// Sanitizes a relay-supplied filename for use as a local file name.
///
/// - Replaces NUL, `/`, `\` and control characters with `_` (runs collapse to one)
/// - Keeps spaces and non-ASCII text as sent
/// - Trims leading/trailing whitespace, dots and underscores, so the result
///   can never be `.`/`..` or a hidden file
/// - Truncates to 255 bytes on a char boundary
pub fn sanitize_filename_for_linux(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        let unsafe_char = c == '/' || c == '\\' || c.is_control();
        if !unsafe_char {
            out.push(c);
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }

    let trimmed = out.trim_matches(|c: char| c.is_whitespace() || c == '.' || c == '_');
    let mut end = trimmed.len().min(NAME_MAX);
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    trimmed[..end].to_string()
}
