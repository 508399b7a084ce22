// Axum request handler: validates relay requests and dispatches to the resolver or the relay.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Json, Response},
};
use tracing::debug;
use urlgrab_core::relay::open_download;
use urlgrab_core::request::{Action, RelayRequest};
use urlgrab_core::resolver::resolve;
use urlgrab_core::RelayError;

use super::response::{attachment_response, error_response};
use super::AppState;

/// Any method on the relay path. POST does the work, OPTIONS answers preflight.
pub(super) async fn relay(
    State(state): State<Arc<AppState>>,
    method: Method,
    body: Bytes,
) -> Response {
    if method == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }
    if method != Method::POST {
        return (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed").into_response();
    }

    match handle_post(&state, &body).await {
        Ok(response) => response,
        Err(e) => error_response(&e, state.upstream_status_passthrough),
    }
}

async fn handle_post(state: &AppState, body: &[u8]) -> Result<Response, RelayError> {
    let request: RelayRequest = serde_json::from_slice(body)
        .map_err(|_| RelayError::invalid("Invalid request body"))?;
    let request = request.validate()?;
    debug!("relay request action={} url={}", request.action.as_str(), request.url);

    match request.action {
        Action::Info => {
            let info = resolve(&request.url, &state.transfer).await?;
            Ok(Json(info).into_response())
        }
        Action::Download => {
            let download = open_download(&request.url, &state.transfer).await?;
            attachment_response(download)
        }
    }
}
