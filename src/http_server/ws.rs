//! WebSocket connection handler
//!
//! Each socket gets its own `Session` and one Event Bus subscription. The
//! loop multiplexes client requests with pushed events; the subscription
//! is dropped when the socket closes.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        ConnectInfo, State,
    },
    response::IntoResponse,
};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;

use super::protocol::{failure, handle_text};
use super::server::AppState;
use crate::auth::Session;
use crate::observability::{log_event_with_fields, LogEvent};

/// Handle WebSocket upgrade request
pub(super) async fn websocket_handler(
    ws: WebSocketUpgrade,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_websocket(socket, addr, state))
}

async fn handle_websocket(socket: WebSocket, addr: SocketAddr, state: Arc<AppState>) {
    let connection = addr.to_string();
    let client_ip = addr.ip().to_string();
    let session = Arc::new(Session::new());

    let (subscriber, mut events) = state.bus.subscribe(connection.clone());
    log_event_with_fields(
        LogEvent::ConnectionOpened,
        &[("connection", &connection), ("subscriber", &subscriber.to_string())],
    );

    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    let reply = dispatch(&state, &session, &client_ip, text).await;
                    if send_json(&mut sender, &reply).await.is_err() {
                        break;
                    }
                }
                Some(Ok(Message::Ping(data))) => {
                    if sender.send(Message::Pong(data)).await.is_err() {
                        break;
                    }
                }
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
            event = events.recv() => match event {
                Some(event) => {
                    if send_json(&mut sender, &event.to_wire_format()).await.is_err() {
                        break;
                    }
                }
                None => break,
            },
        }
    }

    state.bus.unsubscribe(subscriber);
    log_event_with_fields(
        LogEvent::ConnectionClosed,
        &[("connection", &connection), ("subscriber", &subscriber.to_string())],
    );
}

/// Actions may hash passwords, so they run off the async workers
async fn dispatch(
    state: &Arc<AppState>,
    session: &Arc<Session>,
    client_ip: &str,
    text: String,
) -> Value {
    let forum = state.forum.clone();
    let session = Arc::clone(session);
    let client_ip = client_ip.to_string();

    match tokio::task::spawn_blocking(move || handle_text(&forum, &session, &client_ip, &text)).await {
        Ok(reply) => reply,
        Err(e) => {
            log_event_with_fields(LogEvent::RequestFailed, &[("reason", &e.to_string())]);
            failure("Internal server error")
        }
    }
}

async fn send_json(
    sender: &mut SplitSink<WebSocket, Message>,
    value: &Value,
) -> Result<(), axum::Error> {
    sender.send(Message::Text(value.to_string())).await
}
