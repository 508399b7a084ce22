//! HTTP HEAD / metadata probing.
//!
//! Uses the curl crate (libcurl) to fetch response headers and read
//! `Content-Length`, `Content-Type` and `Content-Disposition` for the
//! metadata resolver.

mod parse;

pub(crate) use parse::{header_line, parse_headers, parse_status_line};

use crate::config::TransferOptions;
use crate::error::RelayError;

/// Result of a successful HEAD request: the headers the resolver needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadResult {
    /// Final status code (after redirects).
    pub status: u16,
    /// Reason phrase of the final status line; empty for HTTP/2.
    pub reason: String,
    /// Total size in bytes, if `Content-Length` is present and numeric.
    pub content_length: Option<u64>,
    /// `Content-Type` value if present.
    pub content_type: Option<String>,
    /// `Content-Disposition` value if present (filename hint).
    pub content_disposition: Option<String>,
}

/// Performs a HEAD request and returns parsed metadata.
///
/// Follows redirects. A non-2xx final status is an `UpstreamUnavailable`
/// error carrying the code and reason phrase.
/// Runs in the current thread; call from `spawn_blocking` if used from async code.
pub fn probe(url: &str, opts: &TransferOptions) -> Result<HeadResult, RelayError> {
    let mut headers: Vec<String> = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url)
        .map_err(|e| RelayError::invalid(format!("invalid URL: {}", e)))?;
    opts.apply(&mut easy).map_err(|e| RelayError::network(&e))?;
    easy.nobody(true).map_err(|e| RelayError::network(&e))?; // HEAD request
    easy.timeout(opts.probe_timeout)
        .map_err(|e| RelayError::network(&e))?;

    {
        let mut transfer = easy.transfer();
        transfer
            .header_function(|data| {
                headers.push(parse::header_line(data));
                true
            })
            .map_err(|e| RelayError::network(&e))?;
        transfer.perform().map_err(|e| RelayError::network(&e))?;
    }

    let result = parse::parse_headers(&headers);
    if !(200..300).contains(&result.status) {
        tracing::debug!("HEAD {} returned HTTP {}", url, result.status);
        return Err(RelayError::probe_status(result.status, &result.reason));
    }
    Ok(result)
}
