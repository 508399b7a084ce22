//! `urlgrab get <url>` – download through a relay with byte-level progress.

use anyhow::{Context, Result};
use std::path::Path;
use std::time::{Duration, Instant};
use urlgrab_core::client::{DownloadProgress, RelayClient};
use urlgrab_core::config::RelayConfig;
use urlgrab_core::file_info::format_size;

use crate::cli::endpoint;

/// Minimum interval between progress log lines.
const PROGRESS_EVERY: Duration = Duration::from_millis(500);

fn describe(p: &DownloadProgress) -> String {
    match (p.total, p.percentage()) {
        (Some(total), Some(pct)) => format!(
            "{} / {} ({:.1}%)",
            format_size(p.loaded),
            format_size(total),
            pct
        ),
        _ => format!("{} (total unknown)", format_size(p.loaded)),
    }
}

pub async fn run_get(cfg: &RelayConfig, server: &str, url: &str, out_dir: &Path) -> Result<()> {
    let client = RelayClient::new(endpoint(server, &cfg.route_path), cfg.transfer_options());
    tracing::debug!("downloading {} via {}", url, client.endpoint());

    let (path, last) = tokio::task::spawn_blocking({
        let url = url.to_string();
        let out_dir = out_dir.to_path_buf();
        move || {
            let mut last_report = Instant::now();
            let mut last: Option<DownloadProgress> = None;
            let path = client.download(&url, &out_dir, |p| {
                if last_report.elapsed() >= PROGRESS_EVERY {
                    tracing::info!("progress: {}", describe(p));
                    last_report = Instant::now();
                }
                last = Some(*p);
            })?;
            anyhow::Ok((path, last))
        }
    })
    .await
    .context("download task join")??;

    let received = last.map(|p| p.loaded).unwrap_or(0);
    println!("Saved {} ({})", path.display(), format_size(received));
    Ok(())
}
