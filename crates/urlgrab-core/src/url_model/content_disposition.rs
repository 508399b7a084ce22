//! Content-Disposition header parsing (filename and filename*).

/// Extracts the filename from a raw Content-Disposition header value.
///
/// The first `filename` parameter wins, quoted (`"value"` or `'value'`) or
/// bare. `filename*=UTF-8''percent-encoded` (RFC 5987) is only consulted
/// when no plain `filename` parameter exists. Returns `None` when the chosen
/// parameter is empty.
pub fn parse_content_disposition_filename(header_value: &str) -> Option<String> {
    let mut extended: Option<String> = None;

    for param in split_params(header_value.trim()) {
        let Some((name, v)) = param.split_once('=') else {
            continue;
        };
        let name = name.trim();
        let v = v.trim();

        if name.eq_ignore_ascii_case("filename") {
            let unquoted = unquote(v);
            return if unquoted.is_empty() {
                None
            } else {
                Some(unquoted)
            };
        }

        if extended.is_none() && name.eq_ignore_ascii_case("filename*") {
            extended = decode_extended_value(v).filter(|s| !s.is_empty());
        }
    }

    extended
}

/// Splits header parameters on `;`, ignoring separators inside quoted values.
///
/// A quote only opens a quoted value right after `=`, so apostrophes inside
/// bare tokens (`filename=it's.pdf`) do not swallow later parameters.
fn split_params(value: &str) -> Vec<&str> {
    let mut params = Vec::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut after_equals = false;
    let mut start = 0;

    for (i, c) in value.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, c) {
            (Some('"'), '\\') => escaped = true,
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') if after_equals => quote = Some(c),
            (None, ';') => {
                params.push(&value[start..i]);
                start = i + 1;
            }
            _ => {}
        }
        if !c.is_whitespace() {
            after_equals = quote.is_none() && c == '=';
        }
    }
    params.push(&value[start..]);
    params
}

/// Strips one pair of matching surrounding quotes; double-quoted values are unescaped.
fn unquote(v: &str) -> String {
    if v.len() >= 2 {
        if v.starts_with('"') && v.ends_with('"') {
            return decode_quoted_filename(&v[1..v.len() - 1]);
        }
        if v.starts_with('\'') && v.ends_with('\'') {
            return v[1..v.len() - 1].to_string();
        }
    }
    v.to_string()
}

/// Decodes `charset'lang'percent-encoded` values. Only UTF-8 (and its ASCII subset) is accepted.
fn decode_extended_value(v: &str) -> Option<String> {
    let mut parts = v.splitn(3, '\'');
    let charset = parts.next()?;
    let _lang = parts.next()?;
    let encoded = parts.next()?;
    if !charset.eq_ignore_ascii_case("utf-8") && !charset.eq_ignore_ascii_case("us-ascii") {
        return None;
    }
    Some(percent_decode(encoded))
}

/// Decode backslash-escaped quotes in a quoted filename value.
fn decode_quoted_filename(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                if next == '"' || next == '\\' {
                    out.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}

/// Simple percent-decode; malformed escapes are kept literally.
fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(h), Some(l)) = (hex_digit(bytes[i + 1]), hex_digit(bytes[i + 2])) {
                out.push(h << 4 | l);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
