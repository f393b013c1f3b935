//! WebSocket endpoint: admission, the per-session writer task and the
//! receive loop.

use std::sync::Arc;

use axum::extract::ws::{CloseFrame, Message, Utf8Bytes, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::Response;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use taskhub_auth::SessionRejection;
use taskhub_entity::user::User;
use taskhub_realtime::{ConnectionHandle, InboundMessage, OutboundMessage, RealtimeEngine, close_code};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    /// Access token.
    pub token: Option<String>,
}

/// GET /ws?token={jwt}
///
/// The token is checked before the upgrade completes; a refused session is
/// accepted only to be closed with 4401 or 4403.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    let admission = state.access_guard.admit_session(query.token.as_deref()).await;
    ws.max_message_size(state.config.realtime.max_message_size)
        .on_upgrade(move |socket| async move {
            match admission {
                Ok(user) => run_session(state.realtime.clone(), user, socket).await,
                Err(rejection) => reject(socket, rejection).await,
            }
        })
}

async fn reject(mut socket: WebSocket, rejection: SessionRejection) {
    debug!(code = rejection.close_code(), reason = rejection.reason(), "WebSocket session refused");
    let frame = CloseFrame {
        code: rejection.close_code(),
        reason: Utf8Bytes::from_static(rejection.reason()),
    };
    let _ = socket.send(Message::Close(Some(frame))).await;
}

async fn run_session(realtime: Arc<RealtimeEngine>, user: User, mut socket: WebSocket) {
    let (handle, outbound) = realtime.new_connection(user.id);

    if let Err(e) = realtime.presence.go_online(handle.clone()).await {
        error!(user_id = user.id, error = %e, "Failed to bring session online");
        let frame = CloseFrame {
            code: close_code::INTERNAL_ERROR,
            reason: Utf8Bytes::from_static("presence update failed"),
        };
        let _ = socket.send(Message::Close(Some(frame))).await;
        return;
    }
    info!(user_id = user.id, connection = %handle.id, "WebSocket session opened");

    let (sink, stream) = socket.split();
    let writer = tokio::spawn(write_loop(handle.clone(), outbound, sink));

    receive_loop(&handle, stream).await;

    // Every exit path ends here, including a displaced session.
    realtime.presence.go_offline(&handle).await;
    handle.close(close_code::NORMAL);
    if let Err(e) = writer.await {
        warn!(connection = %handle.id, error = %e, "WebSocket writer task failed");
    }
    info!(
        user_id = user.id,
        connection = %handle.id,
        code = handle.close_code(),
        "WebSocket session closed"
    );
}

/// Drain queued messages into the socket until the handle closes.
async fn write_loop(
    handle: Arc<ConnectionHandle>,
    mut outbound: mpsc::Receiver<OutboundMessage>,
    mut sink: SplitSink<WebSocket, Message>,
) {
    loop {
        tokio::select! {
            biased;
            _ = handle.closed() => {
                let frame = CloseFrame {
                    code: handle.close_code().unwrap_or(close_code::NORMAL),
                    reason: Utf8Bytes::from_static(""),
                };
                let _ = sink.send(Message::Close(Some(frame))).await;
                break;
            }
            msg = outbound.recv() => {
                let Some(msg) = msg else { break };
                let text = match serde_json::to_string(&msg) {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(connection = %handle.id, error = %e, "Failed to encode outbound message");
                        continue;
                    }
                };
                if sink.send(Message::Text(text.into())).await.is_err() {
                    handle.mark_dead();
                    break;
                }
            }
        }
    }
}

/// Answer client frames until the client goes away or the handle closes.
async fn receive_loop(handle: &ConnectionHandle, mut stream: SplitStream<WebSocket>) {
    loop {
        tokio::select! {
            _ = handle.closed() => break,
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    let reply = InboundMessage::reply_to(text.as_str());
                    if handle.send(reply).is_err() && !handle.is_alive() {
                        break;
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                // Ping frames are answered by the protocol layer.
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!(connection = %handle.id, error = %e, "WebSocket receive failed");
                    break;
                }
            }
        }
    }
}
