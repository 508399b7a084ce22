//! CLI for the urlgrab relay: run the server, or use one as a client.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use urlgrab_core::config::{self, RelayConfig};
use urlgrab_core::logging::LogTarget;

use commands::{run_get, run_info, run_serve};

/// Top-level CLI for urlgrab.
#[derive(Debug, Parser)]
#[command(name = "urlgrab")]
#[command(about = "urlgrab: fetch file metadata and relay downloads over HTTP", long_about = None)]
pub struct Cli {
    /// Load configuration from this file instead of ~/.config/urlgrab/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Run the relay server.
    Serve {
        /// Address to listen on (overrides `listen_addr` from the config).
        #[arg(long, value_name = "ADDR")]
        listen: Option<String>,
    },

    /// Ask a relay for a file's name, size and type.
    Info {
        /// Direct HTTP/HTTPS URL of the file.
        url: String,
        /// Base URL of the relay server.
        #[arg(long, default_value = "http://127.0.0.1:3000", value_name = "BASE")]
        server: String,
    },

    /// Download a file through a relay into a local directory.
    Get {
        /// Direct HTTP/HTTPS URL of the file.
        url: String,
        /// Base URL of the relay server.
        #[arg(long, default_value = "http://127.0.0.1:3000", value_name = "BASE")]
        server: String,
        /// Directory to save into (default: current directory).
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
    },
}

impl CliCommand {
    /// The server keeps a log file; one-shot client commands log to stderr.
    pub fn log_target(&self) -> LogTarget {
        match self {
            CliCommand::Serve { .. } => LogTarget::StateFile,
            CliCommand::Info { .. } | CliCommand::Get { .. } => LogTarget::Stderr,
        }
    }
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let cfg = match &self.config {
            Some(path) => config::load_from(path)?,
            None => config::load_or_init()?,
        };
        tracing::debug!("loaded config: {:?}", cfg);

        match self.command {
            CliCommand::Serve { listen } => {
                let cfg = RelayConfig {
                    listen_addr: listen.unwrap_or(cfg.listen_addr),
                    ..cfg
                };
                run_serve(&cfg).await?;
            }
            CliCommand::Info { url, server } => run_info(&cfg, &server, &url).await?,
            CliCommand::Get { url, server, out } => {
                let out_dir = match out {
                    Some(dir) => dir,
                    None => std::env::current_dir()?,
                };
                run_get(&cfg, &server, &url, &out_dir).await?;
            }
        }

        Ok(())
    }
}

/// Relay endpoint URL for a server base URL and the configured route path.
pub(crate) fn endpoint(server: &str, route_path: &str) -> String {
    format!(
        "{}/{}",
        server.trim_end_matches('/'),
        route_path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests;
