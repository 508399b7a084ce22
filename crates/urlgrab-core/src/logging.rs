//! Logging init: file under XDG state dir, or graceful fallback to stderr.
//!
//! The relay server logs to a file so long-running instances keep history;
//! one-shot client commands log to stderr.

use anyhow::Result;
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "info,urlgrab_core=debug,urlgrab_cli=debug";

/// Where log lines go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// `~/.local/state/urlgrab/urlgrab.log`, falling back to stderr.
    StateFile,
    Stderr,
}

/// Writer that is either the log file or stderr (used when file clone fails).
enum FileOrStderr {
    File(fs::File),
    Stderr,
}

impl io::Write for FileOrStderr {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            FileOrStderr::File(f) => f.write(buf),
            FileOrStderr::Stderr => io::stderr().lock().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            FileOrStderr::File(f) => f.flush(),
            FileOrStderr::Stderr => io::stderr().lock().flush(),
        }
    }
}

struct LogFile(fs::File);

impl<'a> MakeWriter<'a> for LogFile {
    type Writer = FileOrStderr;

    fn make_writer(&'a self) -> Self::Writer {
        self.0
            .try_clone()
            .map(FileOrStderr::File)
            .unwrap_or(FileOrStderr::Stderr)
    }
}

/// Installs the global subscriber. Returns the log file path when file logging is active.
///
/// A log file that cannot be opened is not fatal: logging falls back to stderr
/// and the reason is reported there.
pub fn init(target: LogTarget) -> Option<PathBuf> {
    if target == LogTarget::StateFile {
        match open_state_log() {
            Ok((path, file)) => {
                install(BoxMakeWriter::new(LogFile(file)));
                tracing::info!("urlgrab logging initialized at {}", path.display());
                return Some(path);
            }
            Err(e) => {
                install(BoxMakeWriter::new(io::stderr));
                tracing::warn!("log file unavailable, logging to stderr: {:#}", e);
                return None;
            }
        }
    }
    install(BoxMakeWriter::new(io::stderr));
    None
}

fn open_state_log() -> Result<(PathBuf, fs::File)> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("urlgrab")?;
    let log_dir = xdg_dirs.get_state_home().join("urlgrab");
    fs::create_dir_all(&log_dir)?;

    let path = log_dir.join("urlgrab.log");
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)?;
    Ok((path, file))
}

fn install(writer: BoxMakeWriter) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
}
