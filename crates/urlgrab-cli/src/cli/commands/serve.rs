//! `urlgrab serve` – run the relay server until Ctrl-C.

use anyhow::Result;
use urlgrab_core::config::RelayConfig;

use crate::server;

pub async fn run_serve(cfg: &RelayConfig) -> Result<()> {
    let listener = server::bind(cfg).await?;
    server::serve(listener, cfg).await
}
