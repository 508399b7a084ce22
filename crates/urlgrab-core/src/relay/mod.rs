//! Streaming relay: resolve metadata, then pass the origin body through.
//!
//! The probe and the GET are two independent origin requests. If the origin
//! changes between them, the attachment headers may not describe the bytes.

mod stream;

pub use stream::{open_stream, BodyStream};

use crate::config::TransferOptions;
use crate::error::RelayError;
use crate::file_info::FileInfo;
use crate::resolver;

/// A download ready to be forwarded: metadata for the headers plus the live body.
#[derive(Debug)]
pub struct Download {
    pub info: FileInfo,
    pub body: BodyStream,
}

/// Resolves `url`, then opens the full GET.
///
/// Returns once the origin has answered the GET with a success status; the
/// body has not been read yet at that point.
pub async fn open_download(url: &str, opts: &TransferOptions) -> Result<Download, RelayError> {
    let info = resolver::resolve(url, opts).await?;
    let body = open_stream(url, opts).await?;
    Ok(Download { info, body })
}
