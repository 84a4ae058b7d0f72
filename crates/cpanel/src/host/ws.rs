//! WebSocket transport between peers and the control panel.
//!
//! Each socket joins one peer group. Text frames from the peer are decoded as
//! events and handed to the control panel; events broadcast to the group are
//! forwarded to the peer.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use cpanel_server::{Connection, PeerGroup, RawEvent};
use serde::Deserialize;
use tokio::sync::broadcast;

use super::DevHost;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ConnectParams {
    group: Option<String>,
}

impl ConnectParams {
    fn group(&self) -> PeerGroup {
        match self.group.as_deref() {
            Some("panel") => PeerGroup::ControlUi,
            _ => PeerGroup::Browsers,
        }
    }
}

/// Handle WebSocket upgrade for a peer.
pub(crate) async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<ConnectParams>,
    State(host): State<Arc<DevHost>>,
) -> impl IntoResponse {
    let group = params.group();
    ws.on_upgrade(move |socket| handle_socket(socket, host, group))
}

/// Handle an established WebSocket connection.
async fn handle_socket(mut socket: WebSocket, host: Arc<DevHost>, group: PeerGroup) {
    // Subscribe before the panel sees the connection, so its greeting is not missed.
    let mut outbound = host.subscribe(group);
    let (events, connection) = Connection::channel();
    let id = connection.id;
    host.open(connection);
    tracing::debug!(%id, ?group, "Peer connected");

    loop {
        tokio::select! {
            result = outbound.recv() => {
                match result {
                    Ok(event) => {
                        let msg = match serde_json::to_string(&event) {
                            Ok(msg) => msg,
                            Err(e) => {
                                tracing::warn!(error = %e, "Failed to encode event");
                                continue;
                            }
                        };
                        if socket.send(Message::Text(msg.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(%id, skipped, "Peer lagging behind");
                    }
                }
            }
            result = socket.recv() => {
                match result {
                    Some(Ok(Message::Text(text))) => match parse_frame(text.as_str()) {
                        Some(event) => {
                            if events.send(event).is_err() {
                                tracing::debug!(%id, "No control panel attached, dropping event");
                            }
                        }
                        None => tracing::warn!(%id, "Ignoring malformed frame"),
                    },
                    Some(Ok(Message::Close(_)) | Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    tracing::debug!(%id, "Peer disconnected");
}

fn parse_frame(text: &str) -> Option<RawEvent> {
    serde_json::from_str(text).ok()
}
