//! Metadata resolver: HEAD probe turned into a `FileInfo`.

use crate::config::TransferOptions;
use crate::error::RelayError;
use crate::fetch_head::{self, HeadResult};
use crate::file_info::{FileInfo, DEFAULT_CONTENT_TYPE};
use crate::url_model::derive_filename;

/// Probes `url` and builds its `FileInfo`. No retries.
///
/// The curl transfer runs on tokio's blocking pool.
pub async fn resolve(url: &str, opts: &TransferOptions) -> Result<FileInfo, RelayError> {
    let owned = url.to_string();
    let opts = *opts;
    tokio::task::spawn_blocking(move || resolve_blocking(&owned, &opts)).await?
}

/// Blocking variant of [`resolve`]; runs the probe on the current thread.
pub fn resolve_blocking(url: &str, opts: &TransferOptions) -> Result<FileInfo, RelayError> {
    let head = fetch_head::probe(url, opts)?;
    let info = file_info_from_head(url, &head);
    tracing::debug!(
        "resolved {} -> name={} size={} type={}",
        url,
        info.name,
        info.size,
        info.content_type
    );
    Ok(info)
}

/// Assembles a `FileInfo` from probe headers.
pub fn file_info_from_head(url: &str, head: &HeadResult) -> FileInfo {
    let content_type = head
        .content_type
        .clone()
        .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
    let name = derive_filename(url, head.content_disposition.as_deref(), &content_type);

    FileInfo {
        name,
        size: head.content_length.unwrap_or(0),
        content_type,
        url: url.to_string(),
    }
}
