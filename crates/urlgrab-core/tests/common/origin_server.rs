//! Minimal HTTP/1.1 origin for integration tests.
//!
//! Serves one static body to HEAD and GET with configurable status lines and
//! headers. `GET /redirect...` answers 302 to `/final.bin` on the same server.
//! Every response closes the connection.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

/// GET bodies are written in pieces of this size so a closed peer is noticed.
const WRITE_CHUNK: usize = 64 * 1024;

#[derive(Debug, Clone, Copy)]
pub struct OriginOptions {
    /// Status line for HEAD, e.g. "200 OK".
    pub head_status: &'static str,
    /// Status line for GET.
    pub get_status: &'static str,
    pub content_type: Option<&'static str>,
    pub content_disposition: Option<&'static str>,
    /// If false, omit `Content-Length` (GET bodies are then close-delimited).
    pub report_length: bool,
    /// Advertise the full length but close after this many body bytes.
    pub truncate_at: Option<usize>,
    /// Extra header line sent verbatim (without CRLF), e.g. non-UTF-8 bytes.
    pub raw_header: Option<&'static [u8]>,
}

/// Body bytes the origin managed to hand to the socket across GET responses.
#[derive(Debug, Default)]
pub struct WriteLog {
    written: AtomicUsize,
    finished: AtomicBool,
}

impl WriteLog {
    pub fn written(&self) -> usize {
        self.written.load(Ordering::SeqCst)
    }

    /// True once a GET body was fully written or the peer went away.
    pub fn finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }
}

impl Default for OriginOptions {
    fn default() -> Self {
        Self {
            head_status: "200 OK",
            get_status: "200 OK",
            content_type: None,
            content_disposition: None,
            report_length: true,
            truncate_at: None,
            raw_header: None,
        }
    }
}

/// Starts a server in a background thread serving `body`. Returns the base URL
/// without a trailing slash (e.g. "http://127.0.0.1:12345").
pub fn start(body: Vec<u8>, opts: OriginOptions) -> String {
    start_logged(body, opts).0
}

/// Like `start`, also returning the log of GET body bytes written.
pub fn start_logged(body: Vec<u8>, opts: OriginOptions) -> (String, Arc<WriteLog>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let body = Arc::new(body);
    let log = Arc::new(WriteLog::default());
    let server_log = Arc::clone(&log);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let body = Arc::clone(&body);
            let log = Arc::clone(&server_log);
            thread::spawn(move || handle(stream, &body, opts, &log));
        }
    });
    (format!("http://127.0.0.1:{}", port), log)
}

/// A URL on a port nothing listens on.
pub fn dead_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/gone.bin", port)
}

fn handle(mut stream: std::net::TcpStream, body: &[u8], opts: OriginOptions, log: &WriteLog) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let mut first = request.lines().next().unwrap_or("").split_whitespace();
    let method = first.next().unwrap_or("");
    let path = first.next().unwrap_or("/");

    if path.starts_with("/redirect") {
        let _ = stream.write_all(
            b"HTTP/1.1 302 Found\r\nLocation: /final.bin\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        );
        return;
    }

    let is_head = method.eq_ignore_ascii_case("HEAD");
    if !is_head && !method.eq_ignore_ascii_case("GET") {
        let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nConnection: close\r\n\r\n");
        return;
    }

    let status = if is_head { opts.head_status } else { opts.get_status };
    let mut head = format!("HTTP/1.1 {}\r\nConnection: close\r\n", status);
    if opts.report_length {
        head.push_str(&format!("Content-Length: {}\r\n", body.len()));
    }
    if let Some(ct) = opts.content_type {
        head.push_str(&format!("Content-Type: {}\r\n", ct));
    }
    if let Some(cd) = opts.content_disposition {
        head.push_str(&format!("Content-Disposition: {}\r\n", cd));
    }
    let mut head = head.into_bytes();
    if let Some(raw) = opts.raw_header {
        head.extend_from_slice(raw);
        head.extend_from_slice(b"\r\n");
    }
    head.extend_from_slice(b"\r\n");
    if stream.write_all(&head).is_err() || is_head {
        return;
    }

    let end = opts.truncate_at.unwrap_or(body.len()).min(body.len());
    for piece in body[..end].chunks(WRITE_CHUNK) {
        if stream.write_all(piece).is_err() {
            break;
        }
        log.written.fetch_add(piece.len(), Ordering::SeqCst);
    }
    log.finished.store(true, Ordering::SeqCst);
}
