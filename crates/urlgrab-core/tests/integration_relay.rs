//! Integration test: resolver and streaming relay against a local origin.

mod common;

use common::origin_server::{self, OriginOptions};
use std::time::{Duration, Instant};
use urlgrab_core::config::TransferOptions;
use urlgrab_core::relay::{open_download, open_stream, BodyStream};
use urlgrab_core::resolver::resolve;
use urlgrab_core::RelayError;

fn body(len: usize) -> Vec<u8> {
    (0u8..=250).cycle().take(len).collect()
}

async fn drain(mut stream: BodyStream) -> std::io::Result<Vec<u8>> {
    let mut out = Vec::new();
    while let Some(chunk) = stream.next_chunk().await {
        out.extend_from_slice(&chunk?);
    }
    Ok(out)
}

#[tokio::test]
async fn disposition_filename_wins_over_path() {
    let base = origin_server::start(
        body(10),
        OriginOptions {
            content_type: Some("application/pdf"),
            content_disposition: Some("attachment; filename=\"report.pdf\""),
            ..OriginOptions::default()
        },
    );
    let url = format!("{}/files/8c1f2e", base);
    let info = resolve(&url, &TransferOptions::default()).await.unwrap();
    assert_eq!(info.name, "report.pdf");
    assert_eq!(info.size, 10);
    assert_eq!(info.content_type, "application/pdf");
    assert_eq!(info.url, url);
}

#[tokio::test]
async fn latin1_disposition_filename_is_kept() {
    let base = origin_server::start(
        body(10),
        OriginOptions {
            content_type: Some("application/pdf"),
            raw_header: Some(b"Content-Disposition: attachment; filename=\"r\xe9sum\xe9.pdf\""),
            ..OriginOptions::default()
        },
    );
    let info = resolve(&format!("{}/dl/42", base), &TransferOptions::default())
        .await
        .unwrap();
    assert_eq!(info.name, "résumé.pdf");
}

#[tokio::test]
async fn path_name_gets_extension_from_content_type() {
    let base = origin_server::start(
        b"{}".to_vec(),
        OriginOptions {
            content_type: Some("application/json"),
            ..OriginOptions::default()
        },
    );
    let info = resolve(&format!("{}/api/data", base), &TransferOptions::default())
        .await
        .unwrap();
    assert_eq!(info.name, "data.json");
}

#[tokio::test]
async fn root_path_uses_fallback_name_and_default_type() {
    let base = origin_server::start(body(3), OriginOptions::default());
    let info = resolve(&format!("{}/", base), &TransferOptions::default())
        .await
        .unwrap();
    assert_eq!(info.name, "downloaded-file");
    assert_eq!(info.content_type, "application/octet-stream");
}

#[tokio::test]
async fn missing_length_reports_zero() {
    let base = origin_server::start(
        body(64),
        OriginOptions {
            report_length: false,
            ..OriginOptions::default()
        },
    );
    let info = resolve(&format!("{}/blob.bin", base), &TransferOptions::default())
        .await
        .unwrap();
    assert_eq!(info.size, 0);
}

#[tokio::test]
async fn redirect_reports_final_hop() {
    let base = origin_server::start(
        body(5),
        OriginOptions {
            content_type: Some("application/zip"),
            ..OriginOptions::default()
        },
    );
    let info = resolve(&format!("{}/redirect/latest", base), &TransferOptions::default())
        .await
        .unwrap();
    assert_eq!(info.size, 5);
    assert_eq!(info.content_type, "application/zip");
    // The display name comes from the requested URL, not the redirect target.
    assert_eq!(info.name, "latest.zip");
}

#[tokio::test]
async fn probe_404_is_upstream_unavailable() {
    let base = origin_server::start(
        Vec::new(),
        OriginOptions {
            head_status: "404 Not Found",
            ..OriginOptions::default()
        },
    );
    let err = resolve(&format!("{}/missing.txt", base), &TransferOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RelayError::UpstreamUnavailable {
            status: Some(404),
            ..
        }
    ));
    assert_eq!(err.to_string(), "Failed to access file: 404 Not Found");
}

#[tokio::test]
async fn connection_refused_is_network_error() {
    let err = resolve(&origin_server::dead_url(), &TransferOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.upstream_status(), None);
    assert!(err.to_string().starts_with("Network error:"), "{}", err);
}

#[tokio::test]
async fn download_streams_exact_bytes() {
    let data = body(256 * 1024);
    let base = origin_server::start(
        data.clone(),
        OriginOptions {
            content_type: Some("video/mp4"),
            ..OriginOptions::default()
        },
    );
    let opts = TransferOptions {
        stream_buffer_chunks: 1,
        ..TransferOptions::default()
    };
    let download = open_download(&format!("{}/clip", base), &opts).await.unwrap();
    assert_eq!(download.info.name, "clip.mp4");
    assert_eq!(download.info.size, data.len() as u64);

    let received = drain(download.body).await.unwrap();
    assert_eq!(received.len(), data.len());
    assert_eq!(received, data);
}

#[tokio::test]
async fn close_delimited_body_is_streamed() {
    let data = body(40_000);
    let base = origin_server::start(
        data.clone(),
        OriginOptions {
            report_length: false,
            ..OriginOptions::default()
        },
    );
    let stream = open_stream(&format!("{}/x.bin", base), &TransferOptions::default())
        .await
        .unwrap();
    assert_eq!(drain(stream).await.unwrap(), data);
}

#[tokio::test]
async fn empty_body_ends_immediately() {
    let base = origin_server::start(Vec::new(), OriginOptions::default());
    let stream = open_stream(&format!("{}/empty.txt", base), &TransferOptions::default())
        .await
        .unwrap();
    assert!(drain(stream).await.unwrap().is_empty());
}

#[tokio::test]
async fn get_failure_after_probe_success() {
    let base = origin_server::start(
        b"nope".to_vec(),
        OriginOptions {
            get_status: "503 Service Unavailable",
            ..OriginOptions::default()
        },
    );
    let err = open_download(&format!("{}/file.zip", base), &TransferOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RelayError::UpstreamDownloadFailed {
            status: Some(503),
            ..
        }
    ));
    assert_eq!(err.to_string(), "Download failed: 503 Service Unavailable");
}

#[tokio::test]
async fn mid_stream_failure_surfaces_as_stream_error() {
    let base = origin_server::start(
        body(64 * 1024),
        OriginOptions {
            truncate_at: Some(1000),
            ..OriginOptions::default()
        },
    );
    let stream = open_stream(&format!("{}/big.iso", base), &TransferOptions::default())
        .await
        .unwrap();
    assert!(drain(stream).await.is_err());
}

#[tokio::test]
async fn dropping_the_body_stops_the_transfer() {
    const SIZE: usize = 64 * 1024 * 1024;
    let (base, log) = origin_server::start_logged(body(SIZE), OriginOptions::default());
    let opts = TransferOptions {
        stream_buffer_chunks: 1,
        ..TransferOptions::default()
    };
    let mut stream = open_stream(&format!("{}/huge.bin", base), &opts)
        .await
        .unwrap();
    let first = stream.next_chunk().await.unwrap().unwrap();
    assert!(!first.is_empty());
    drop(stream);

    // The origin's writes fail once curl has closed the connection.
    let deadline = Instant::now() + Duration::from_secs(20);
    while !log.finished() && Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert!(log.finished(), "origin still writing after the body was dropped");
    assert!(
        log.written() < SIZE / 2,
        "origin wrote {} of {} bytes",
        log.written(),
        SIZE
    );
}
