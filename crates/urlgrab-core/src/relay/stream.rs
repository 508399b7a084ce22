//! Streamed GET over libcurl.
//!
//! The transfer runs on tokio's blocking pool and pushes each chunk libcurl
//! hands over into a bounded channel. A full channel blocks the transfer
//! (back-pressure); a dropped receiver aborts it.

use crate::config::TransferOptions;
use crate::error::RelayError;
use crate::fetch_head::{header_line, parse_status_line};
use bytes::Bytes;
use std::cell::{Cell, RefCell};
use std::io;
use tokio::sync::{mpsc, oneshot};

type HeadOutcome = Result<(), RelayError>;

/// Receiving end of a relayed body. Ends cleanly when the origin finishes; yields
/// an `Err` if the origin transfer breaks mid-stream.
#[derive(Debug)]
pub struct BodyStream {
    rx: mpsc::Receiver<io::Result<Bytes>>,
}

impl BodyStream {
    /// Next chunk, or `None` once the origin body is complete.
    pub async fn next_chunk(&mut self) -> Option<io::Result<Bytes>> {
        self.rx.recv().await
    }

    pub fn into_receiver(self) -> mpsc::Receiver<io::Result<Bytes>> {
        self.rx
    }
}

/// Starts a GET for `url` and waits until the origin's final status is known.
///
/// Non-2xx fails with `UpstreamDownloadFailed` and nothing is streamed.
pub async fn open_stream(url: &str, opts: &TransferOptions) -> Result<BodyStream, RelayError> {
    let (head_tx, head_rx) = oneshot::channel::<HeadOutcome>();
    let (chunk_tx, chunk_rx) = mpsc::channel(opts.stream_buffer_chunks);

    let owned = url.to_string();
    let opts = *opts;
    let task =
        tokio::task::spawn_blocking(move || run_transfer(&owned, &opts, head_tx, chunk_tx));

    match head_rx.await {
        Ok(Ok(())) => Ok(BodyStream { rx: chunk_rx }),
        Ok(Err(e)) => Err(e),
        Err(_) => {
            task.await?;
            Err(RelayError::Internal(
                "transfer ended before response headers".to_string(),
            ))
        }
    }
}

/// One-shot signal telling the async side whether the body will follow.
struct HeadSignal {
    tx: RefCell<Option<oneshot::Sender<HeadOutcome>>>,
    accepted: Cell<bool>,
}

impl HeadSignal {
    fn new(tx: oneshot::Sender<HeadOutcome>) -> Self {
        Self {
            tx: RefCell::new(Some(tx)),
            accepted: Cell::new(false),
        }
    }

    fn send(&self, outcome: HeadOutcome) {
        if let Some(tx) = self.tx.borrow_mut().take() {
            self.accepted.set(outcome.is_ok());
            let _ = tx.send(outcome);
        }
    }

    fn is_sent(&self) -> bool {
        self.tx.borrow().is_none()
    }

    /// True once a success status was signalled and bytes may be flowing.
    fn is_accepted(&self) -> bool {
        self.accepted.get()
    }
}

fn configure(
    easy: &mut curl::easy::Easy,
    url: &str,
    opts: &TransferOptions,
) -> Result<(), curl::Error> {
    easy.url(url)?;
    opts.apply(easy)?;
    easy.get(true)?;
    Ok(())
}

/// Drives the transfer. The final status is checked when the first body byte
/// arrives, so a non-2xx answer is reported before anything is forwarded.
fn perform(
    easy: &mut curl::easy::Easy,
    status: &RefCell<(u16, String)>,
    head: &HeadSignal,
    chunk_tx: &mpsc::Sender<io::Result<Bytes>>,
    relayed: &Cell<u64>,
) -> Result<(), curl::Error> {
    let mut transfer = easy.transfer();
    transfer.header_function(|data| {
        if let Some(s) = parse_status_line(&header_line(data)) {
            *status.borrow_mut() = s;
        }
        true
    })?;
    transfer.write_function(|data| {
        if !head.is_sent() {
            let (code, reason) = status.borrow().clone();
            if !(200..300).contains(&code) {
                head.send(Err(RelayError::download_status(code, &reason)));
                return Ok(0);
            }
            head.send(Ok(()));
        }
        match chunk_tx.blocking_send(Ok(Bytes::copy_from_slice(data))) {
            Ok(()) => {
                relayed.set(relayed.get() + data.len() as u64);
                Ok(data.len())
            }
            // Receiver dropped: the caller went away. Returning 0 aborts libcurl.
            Err(_) => Ok(0),
        }
    })?;
    transfer.perform()
}

fn run_transfer(
    url: &str,
    opts: &TransferOptions,
    head_tx: oneshot::Sender<HeadOutcome>,
    chunk_tx: mpsc::Sender<io::Result<Bytes>>,
) {
    let head = HeadSignal::new(head_tx);
    let status: RefCell<(u16, String)> = RefCell::new((0, String::new()));
    let relayed = Cell::new(0u64);

    let mut easy = curl::easy::Easy::new();
    if let Err(e) = configure(&mut easy, url, opts) {
        head.send(Err(RelayError::download_network(&e)));
        return;
    }

    let outcome = perform(&mut easy, &status, &head, &chunk_tx, &relayed);

    match outcome {
        Ok(()) if !head.is_sent() => {
            // Origin sent headers but no body bytes.
            let (code, reason) = status.borrow().clone();
            if (200..300).contains(&code) {
                head.send(Ok(()));
            } else {
                head.send(Err(RelayError::download_status(code, &reason)));
            }
        }
        Ok(()) => {
            tracing::debug!("relayed {} bytes from {}", relayed.get(), url);
        }
        Err(e) if !head.is_sent() => {
            head.send(Err(RelayError::download_network(&e)));
        }
        // Non-2xx answer already reported; the abort is ours.
        Err(_) if !head.is_accepted() => {}
        Err(e) => {
            if chunk_tx.is_closed() {
                tracing::debug!(
                    "relay of {} stopped after {} bytes: receiver closed",
                    url,
                    relayed.get()
                );
            } else {
                tracing::warn!(
                    "relay of {} broke after {} bytes: {}",
                    url,
                    relayed.get(),
                    e
                );
                let _ = chunk_tx.blocking_send(Err(io::Error::new(io::ErrorKind::Other, e)));
            }
        }
    }
}
