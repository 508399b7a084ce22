use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Relay configuration loaded from `~/.config/urlgrab/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Socket address the relay server binds to.
    pub listen_addr: String,
    /// Path of the single `info`/`download` endpoint.
    pub route_path: String,
    /// Connect timeout for origin requests, in seconds.
    pub connect_timeout_secs: u64,
    /// Total timeout for the HEAD probe, in seconds. The streamed GET has none.
    pub probe_timeout_secs: u64,
    /// Maximum redirects followed per origin request.
    pub max_redirects: u32,
    /// Capacity (in chunks) of the channel between the curl transfer and the response body.
    pub stream_buffer_chunks: usize,
    /// Answer upstream failures that carry an origin status with 502 instead of 500.
    #[serde(default)]
    pub upstream_status_passthrough: bool,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:3000".to_string(),
            route_path: "/api/download".to_string(),
            connect_timeout_secs: 15,
            probe_timeout_secs: 30,
            max_redirects: 10,
            stream_buffer_chunks: 16,
            upstream_status_passthrough: false,
        }
    }
}

impl RelayConfig {
    /// Per-request curl settings derived from this config.
    pub fn transfer_options(&self) -> TransferOptions {
        TransferOptions {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            probe_timeout: Duration::from_secs(self.probe_timeout_secs),
            max_redirects: self.max_redirects,
            stream_buffer_chunks: self.stream_buffer_chunks.max(1),
        }
    }
}

/// Curl settings shared by the HEAD probe and the streamed GET.
#[derive(Debug, Clone, Copy)]
pub struct TransferOptions {
    pub connect_timeout: Duration,
    pub probe_timeout: Duration,
    pub max_redirects: u32,
    pub stream_buffer_chunks: usize,
}

impl Default for TransferOptions {
    fn default() -> Self {
        RelayConfig::default().transfer_options()
    }
}

impl TransferOptions {
    /// Applies redirect and connect settings common to every origin request.
    pub(crate) fn apply(&self, easy: &mut curl::easy::Easy) -> Result<(), curl::Error> {
        easy.follow_location(true)?;
        easy.max_redirections(self.max_redirects)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.useragent(concat!("urlgrab/", env!("CARGO_PKG_VERSION")))?;
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("urlgrab")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<RelayConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = RelayConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    load_from(&path)
}

/// Load configuration from an explicit path. The file must exist.
pub fn load_from(path: &Path) -> Result<RelayConfig> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let cfg: RelayConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}
