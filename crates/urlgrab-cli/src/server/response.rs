//! Response shaping: CORS headers, JSON errors, and the streamed attachment.

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use tokio_stream::wrappers::ReceiverStream;
use tracing::error;
use urlgrab_core::relay::Download;
use urlgrab_core::RelayError;

/// Adds the permissive cross-origin headers every relay response carries.
pub(super) async fn apply_cors(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type, Authorization"),
    );
    response
}

/// Status for a failed request: 400 for bad input, 500 otherwise, or 502 for
/// upstream failures with an origin status when passthrough is enabled.
pub(super) fn error_status(err: &RelayError, upstream_status_passthrough: bool) -> StatusCode {
    if err.is_invalid_input() {
        StatusCode::BAD_REQUEST
    } else if upstream_status_passthrough && err.upstream_status().is_some() {
        StatusCode::BAD_GATEWAY
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// `{ "error": <message> }` with the mapped status.
pub(super) fn error_response(err: &RelayError, upstream_status_passthrough: bool) -> Response {
    let status = error_status(err, upstream_status_passthrough);
    if status.is_server_error() {
        error!("relay request failed: {}", err);
    }
    (status, Json(serde_json::json!({ "error": err.to_string() }))).into_response()
}

/// 200 with the origin body streamed through and attachment headers from the probe.
///
/// `Content-Length` is only sent when the probe reported a non-zero size.
pub(super) fn attachment_response(download: Download) -> Result<Response, RelayError> {
    let Download { info, body } = download;

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, header_value(&info.content_type)?);
    headers.insert(
        header::CONTENT_DISPOSITION,
        header_value(&info.attachment_disposition())?,
    );
    if let Some(size) = info.known_size() {
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(size));
    }

    let stream = ReceiverStream::new(body.into_receiver());
    Ok((StatusCode::OK, headers, Body::from_stream(stream)).into_response())
}

/// Raw bytes are allowed (UTF-8 filenames pass through); control characters are not.
fn header_value(value: &str) -> Result<HeaderValue, RelayError> {
    HeaderValue::from_bytes(value.as_bytes())
        .map_err(|_| RelayError::Internal(format!("cannot send header value {:?}", value)))
}
