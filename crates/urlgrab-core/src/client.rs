//! Client side of the relay endpoint, used by `urlgrab info` and `urlgrab get`.
//!
//! Blocking (libcurl); call from `spawn_blocking` if used from async code.

use crate::config::TransferOptions;
use crate::fetch_head::{header_line, parse_headers};
use crate::file_info::FileInfo;
use crate::url_model::{is_valid_url, local_filename};
use anyhow::{bail, Context, Result};
use std::cell::RefCell;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Bytes received so far for a relayed download.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DownloadProgress {
    pub loaded: u64,
    /// From the relay's `Content-Length`; `None` when it did not send one.
    pub total: Option<u64>,
}

impl DownloadProgress {
    /// Percentage complete, when the total is known and non-zero.
    pub fn percentage(&self) -> Option<f64> {
        match self.total {
            Some(t) if t > 0 => Some(self.loaded as f64 / t as f64 * 100.0),
            _ => None,
        }
    }
}

/// Talks to one relay endpoint (e.g. `http://127.0.0.1:3000/api/download`).
#[derive(Debug, Clone)]
pub struct RelayClient {
    endpoint: String,
    opts: TransferOptions,
}

impl RelayClient {
    pub fn new(endpoint: impl Into<String>, opts: TransferOptions) -> Self {
        Self {
            endpoint: endpoint.into(),
            opts,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Asks the relay for a file's metadata.
    pub fn info(&self, url: &str) -> Result<FileInfo> {
        check_url(url)?;
        let mut easy = self.post(url, "info")?;
        let mut headers = Vec::new();
        let mut body = Vec::new();
        {
            let mut transfer = easy.transfer();
            transfer.header_function(|data| {
                headers.push(header_line(data));
                true
            })?;
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform().context("relay request failed")?;
        }

        let status = parse_headers(&headers).status;
        if !(200..300).contains(&status) {
            bail!("{}", error_message(status, &body));
        }
        serde_json::from_slice(&body).context("relay returned malformed file info")
    }

    /// Downloads `url` through the relay into `out_dir`, named from the relay's
    /// Content-Disposition. Returns the final path.
    ///
    /// Bytes go to `<name>.part` and are renamed once the transfer completes,
    /// so an interrupted transfer never leaves a file under the final name.
    pub fn download<F>(&self, url: &str, out_dir: &Path, mut on_progress: F) -> Result<PathBuf>
    where
        F: FnMut(&DownloadProgress),
    {
        check_url(url)?;
        let mut easy = self.post(url, "download")?;
        let headers: RefCell<Vec<String>> = RefCell::new(Vec::new());
        let mut sink = Sink::new(out_dir);

        let performed = {
            let mut transfer = easy.transfer();
            transfer.header_function(|data| {
                headers.borrow_mut().push(header_line(data));
                true
            })?;
            transfer.write_function(|data| {
                Ok(sink.accept(&headers.borrow(), data, &mut on_progress))
            })?;
            transfer.perform()
        };

        if let Some(e) = sink.io_error.take() {
            sink.discard();
            return Err(e).context("write download");
        }
        if let Err(e) = performed {
            sink.discard();
            return Err(e).context("relay download failed");
        }

        let headers = headers.into_inner();
        let head = parse_headers(&headers);
        if !(200..300).contains(&head.status) {
            bail!("{}", error_message(head.status, &sink.error_body));
        }
        sink.finish(&headers)
    }

    fn post(&self, url: &str, action: &str) -> Result<curl::easy::Easy> {
        let body = serde_json::json!({ "url": url, "action": action }).to_string();

        let mut easy = curl::easy::Easy::new();
        easy.url(&self.endpoint).context("invalid relay endpoint")?;
        self.opts.apply(&mut easy)?;
        easy.post(true)?;
        easy.post_fields_copy(body.as_bytes())?;
        let mut list = curl::easy::List::new();
        list.append("Content-Type: application/json")?;
        easy.http_headers(list)?;
        Ok(easy)
    }
}

fn check_url(url: &str) -> Result<()> {
    if !is_valid_url(url) {
        bail!("not an http(s) URL: {}", url);
    }
    Ok(())
}

/// The relay's JSON `error` text, or a generic message with the status.
fn error_message(status: u16, body: &[u8]) -> String {
    serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
        .unwrap_or_else(|| format!("Request failed: {}", status))
}

/// Destination of a relayed body: the `.part` file on success, an in-memory
/// error body otherwise.
struct Sink<'a> {
    out_dir: &'a Path,
    part: Option<(PathBuf, File)>,
    error_body: Vec<u8>,
    progress: DownloadProgress,
    io_error: Option<io::Error>,
    decided: bool,
}

impl<'a> Sink<'a> {
    fn new(out_dir: &'a Path) -> Self {
        Self {
            out_dir,
            part: None,
            error_body: Vec::new(),
            progress: DownloadProgress {
                loaded: 0,
                total: None,
            },
            io_error: None,
            decided: false,
        }
    }

    /// Handles one chunk; returns the count libcurl should see (0 aborts).
    fn accept<F>(&mut self, headers: &[String], data: &[u8], on_progress: &mut F) -> usize
    where
        F: FnMut(&DownloadProgress),
    {
        if !self.decided {
            self.decided = true;
            let head = parse_headers(headers);
            if (200..300).contains(&head.status) {
                self.progress.total = head.content_length.filter(|n| *n > 0);
                if let Err(e) = self.open(head.content_disposition.as_deref()) {
                    self.io_error = Some(e);
                    return 0;
                }
            }
        }

        match self.part.as_mut() {
            Some((_, file)) => {
                if let Err(e) = file.write_all(data) {
                    self.io_error = Some(e);
                    return 0;
                }
                self.progress.loaded += data.len() as u64;
                on_progress(&self.progress);
            }
            None => self.error_body.extend_from_slice(data),
        }
        data.len()
    }

    fn open(&mut self, content_disposition: Option<&str>) -> io::Result<()> {
        let name = local_filename(content_disposition);
        let part_path = self.out_dir.join(format!("{}.part", name));
        let file = File::create(&part_path)?;
        self.part = Some((part_path, file));
        Ok(())
    }

    /// Renames the `.part` file into place (creating an empty file for an empty body).
    fn finish(mut self, headers: &[String]) -> Result<PathBuf> {
        if self.part.is_none() {
            let head = parse_headers(headers);
            self.open(head.content_disposition.as_deref())?;
        }
        let (part_path, mut file) = self.part.take().context("download sink not open")?;
        file.flush()?;
        drop(file);

        let final_path = part_path.with_extension("");
        fs::rename(&part_path, &final_path)
            .with_context(|| format!("rename {}", part_path.display()))?;
        Ok(final_path)
    }

    fn discard(&mut self) {
        if let Some((path, file)) = self.part.take() {
            drop(file);
            let _ = fs::remove_file(path);
        }
    }
}
