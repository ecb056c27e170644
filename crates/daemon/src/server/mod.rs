// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP and WebSocket surface.
//!
//! Every URL path addresses a location in the document: `GET` reads it,
//! `PUT` writes it, `DELETE` removes it, and a `GET` carrying a WebSocket
//! upgrade subscribes to it. Reads are served straight from the shared
//! read cell; writes and subscriptions go through the coordinator queue.

mod metrics;
mod ws;

pub use metrics::metrics_router;

use crate::auth::{AccessMode, AuthConfig, AuthError};
use crate::coordinator::{CoordinatorHandle, ModifyError};
use axum::body::Bytes;
use axum::extract::{State, WebSocketUpgrade};
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use icepeak_core::{Modification, Path};
use icepeak_storage::ValueReader;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Shared context for all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub reader: ValueReader,
    pub coordinator: CoordinatorHandle,
    /// Token verification; `None` disables auth entirely.
    pub auth: Option<Arc<AuthConfig>>,
    /// Outbound buffer capacity for new subscribers.
    pub channel_capacity: usize,
}

/// The client-facing router. A fallback handler rather than fixed routes:
/// any path is a valid document location.
pub fn router(state: AppState) -> Router {
    Router::new().fallback(dispatch).with_state(state)
}

async fn dispatch(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    ws: Option<WebSocketUpgrade>,
    body: Bytes,
) -> Response {
    let path = Path::from_url_path(uri.path());

    let mode = if method == Method::GET {
        AccessMode::Read
    } else if method == Method::PUT || method == Method::DELETE {
        AccessMode::Write
    } else {
        return error_response(
            StatusCode::METHOD_NOT_ALLOWED,
            "method_not_allowed",
            format!("unsupported method {method}"),
        );
    };

    if let Some(auth) = &state.auth {
        let token = bearer_token(&headers, &uri);
        if let Err(e) = auth.authorize(token.as_deref(), &path, mode) {
            return e.into_response();
        }
    }

    if method == Method::GET {
        match ws {
            Some(upgrade) => {
                upgrade.on_upgrade(move |socket| ws::serve_subscriber(socket, state, path))
            }
            None => read(&state, &path),
        }
    } else if method == Method::PUT {
        write(&state, path, &body).await
    } else {
        remove(&state, path).await
    }
}

/// Wait-free read from the shared cell; never touches the queue.
fn read(state: &AppState, path: &Path) -> Response {
    let document = state.reader.current();
    match icepeak_core::get(&document, path) {
        Some(value) => Json(value.clone()).into_response(),
        None => error_response(StatusCode::NOT_FOUND, "not_found", format!("no value at {path}")),
    }
}

async fn write(state: &AppState, path: Path, body: &[u8]) -> Response {
    let value: Value = match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(e) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "bad_request",
                format!("malformed JSON body: {e}"),
            )
        }
    };
    apply(state, Modification::Put { path, value }).await
}

async fn remove(state: &AppState, path: Path) -> Response {
    apply(state, Modification::Delete { path }).await
}

/// Acknowledged once the journal append is durable, not once synced.
async fn apply(state: &AppState, modification: Modification) -> Response {
    match state.coordinator.modify(modification).await {
        Ok(()) => Json(serde_json::json!({})).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Token from the `Authorization: Bearer` header, or the `access_token`
/// query parameter as a fallback for WebSocket clients that cannot set
/// headers.
fn bearer_token(headers: &HeaderMap, uri: &Uri) -> Option<String> {
    if let Some(token) = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
    {
        return Some(token.to_owned());
    }
    uri.query()?
        .split('&')
        .find_map(|pair| pair.strip_prefix("access_token=").map(str::to_owned))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
}

fn error_response(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (status, Json(ErrorBody { error: message.into(), code })).into_response()
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "missing_token"),
            AuthError::InvalidToken(_) => (StatusCode::UNAUTHORIZED, "invalid_token"),
            AuthError::Forbidden { .. } => (StatusCode::FORBIDDEN, "forbidden"),
        };
        error_response(status, code, self.to_string())
    }
}

impl IntoResponse for ModifyError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ModifyError::Saturated => (StatusCode::SERVICE_UNAVAILABLE, "saturated"),
            ModifyError::Closed => (StatusCode::INTERNAL_SERVER_ERROR, "unavailable"),
            ModifyError::Persistence(_) => (StatusCode::INTERNAL_SERVER_ERROR, "persistence"),
        };
        error_response(status, code, self.to_string())
    }
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
