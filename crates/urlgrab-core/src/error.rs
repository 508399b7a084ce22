//! Error type shared by the resolver, the relay and the request boundary.

use thiserror::Error;

/// Failure of a single `info` or `download` request.
///
/// The `Display` text is what callers see in the JSON `error` field, so the
/// upstream variants carry the fully formatted message.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Missing/malformed URL or unknown action. Raised before any network I/O.
    #[error("{0}")]
    InvalidInput(String),

    /// The HEAD probe failed: non-2xx status, or the request never completed.
    #[error("{message}")]
    UpstreamUnavailable { status: Option<u16>, message: String },

    /// The full GET failed after the probe succeeded.
    #[error("{message}")]
    UpstreamDownloadFailed { status: Option<u16>, message: String },

    /// Anything else (blocking task panicked, stream broke before headers, ...).
    #[error("{0}")]
    Internal(String),
}

impl RelayError {
    pub fn invalid(message: impl Into<String>) -> Self {
        RelayError::InvalidInput(message.into())
    }

    /// Probe answered with a non-success status.
    pub fn probe_status(code: u16, reason: &str) -> Self {
        RelayError::UpstreamUnavailable {
            status: Some(code),
            message: status_message("Failed to access file", code, reason),
        }
    }

    /// Full GET answered with a non-success status.
    pub fn download_status(code: u16, reason: &str) -> Self {
        RelayError::UpstreamDownloadFailed {
            status: Some(code),
            message: status_message("Download failed", code, reason),
        }
    }

    /// Transport-level failure (DNS, refused connection, timeout) of the probe.
    pub fn network(err: &curl::Error) -> Self {
        RelayError::UpstreamUnavailable {
            status: None,
            message: format!("Network error: {}", err),
        }
    }

    /// Transport-level failure of the full GET before any body byte arrived.
    pub fn download_network(err: &curl::Error) -> Self {
        RelayError::UpstreamDownloadFailed {
            status: None,
            message: format!("Network error: {}", err),
        }
    }

    /// Origin status carried by upstream failures, if one was received.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            RelayError::UpstreamUnavailable { status, .. }
            | RelayError::UpstreamDownloadFailed { status, .. } => *status,
            RelayError::InvalidInput(_) | RelayError::Internal(_) => None,
        }
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, RelayError::InvalidInput(_))
    }
}

fn status_message(prefix: &str, code: u16, reason: &str) -> String {
    let reason = reason.trim();
    if reason.is_empty() {
        format!("{}: {}", prefix, code)
    } else {
        format!("{}: {} {}", prefix, code, reason)
    }
}

impl From<tokio::task::JoinError> for RelayError {
    fn from(e: tokio::task::JoinError) -> Self {
        RelayError::Internal(format!("transfer task failed: {}", e))
    }
}
