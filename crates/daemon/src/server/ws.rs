// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket subscription connections.

use crate::broadcast::{Subscriber, SubscriberId};
use crate::server::AppState;
use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use icepeak_core::Path;
use tracing::debug;

/// Drive one subscription connection.
///
/// The first outbound frame is the current value at the path (delivered by
/// the coordinator on registration); every later frame is the value after
/// a modification affecting the path. JSON serialization happens here, off
/// the coordinator loop. The channel closing means the coordinator dropped
/// us (lagging) or is shutting down; either way the socket is closed.
pub(crate) async fn serve_subscriber(socket: WebSocket, state: AppState, path: Path) {
    let id = SubscriberId::next();
    let (subscriber, mut rx) = Subscriber::new(path.clone(), state.channel_capacity);
    if state.coordinator.subscribe(id, subscriber).await.is_err() {
        return;
    }
    debug!(%id, path = %path, "subscription opened");

    let (mut sink, mut stream) = socket.split();
    loop {
        tokio::select! {
            update = rx.recv() => {
                let Some(value) = update else { break };
                let Ok(text) = serde_json::to_string(&*value) else { break };
                if sink.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
            incoming = stream.next() => {
                match incoming {
                    // Inbound data frames carry nothing for us; pings are
                    // answered by the protocol layer.
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    let _ = state.coordinator.unsubscribe(path, id).await;
    debug!(%id, "subscription closed");
}
