//! `urlgrab info <url>` – print what a relay resolves for a URL.

use anyhow::{Context, Result};
use urlgrab_core::client::RelayClient;
use urlgrab_core::config::RelayConfig;
use urlgrab_core::file_info::format_size;

use crate::cli::endpoint;

pub async fn run_info(cfg: &RelayConfig, server: &str, url: &str) -> Result<()> {
    let client = RelayClient::new(endpoint(server, &cfg.route_path), cfg.transfer_options());
    let info = tokio::task::spawn_blocking({
        let url = url.to_string();
        move || client.info(&url)
    })
    .await
    .context("info task join")??;

    println!("Name: {}", info.name);
    if info.size > 0 {
        println!("Size: {} ({} bytes)", format_size(info.size), info.size);
    } else {
        println!("Size: unknown");
    }
    println!("Type: {}", info.content_type);
    println!("URL:  {}", info.url);
    Ok(())
}
