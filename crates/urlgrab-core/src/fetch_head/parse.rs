//! Parse HTTP response header lines into HeadResult.

use super::HeadResult;

/// Parse collected header lines into HeadResult.
///
/// With redirects followed, libcurl reports every hop's header block; each
/// status line starts a new block so only the final response's headers survive.
pub(crate) fn parse_headers(lines: &[String]) -> HeadResult {
    let mut result = HeadResult::default();

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some((status, reason)) = parse_status_line(line) {
            result = HeadResult {
                status,
                reason,
                ..HeadResult::default()
            };
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            let value = value.trim();
            if name.eq_ignore_ascii_case("content-length") {
                result.content_length = value.parse::<u64>().ok();
            }
            if name.eq_ignore_ascii_case("content-type") && !value.is_empty() {
                result.content_type = Some(value.to_string());
            }
            if name.eq_ignore_ascii_case("content-disposition") {
                result.content_disposition = Some(value.to_string());
            }
        }
    }

    result
}

/// Parses `HTTP/1.1 404 Not Found` (or `HTTP/2 200`) into code and reason phrase.
pub(crate) fn parse_status_line(line: &str) -> Option<(u16, String)> {
    let rest = line.strip_prefix("HTTP/")?;
    let mut parts = rest.splitn(3, ' ');
    let _version = parts.next()?;
    let code = parts.next()?.trim().parse::<u16>().ok()?;
    let reason = parts.next().unwrap_or("").trim().to_string();
    Some((code, reason))
}

/// Decodes one raw header line from libcurl, without the trailing CRLF.
///
/// Header bytes that are not UTF-8 are read as ISO-8859-1, so a Latin-1
/// `filename="r\xe9sum\xe9.pdf"` still yields `résumé.pdf`.
pub(crate) fn header_line(data: &[u8]) -> String {
    let line = match std::str::from_utf8(data) {
        Ok(s) => s.to_string(),
        Err(_) => data.iter().map(|&b| char::from(b)).collect(),
    };
    line.trim_end().to_string()
}
