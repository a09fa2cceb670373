//! WebSocket connection gateway.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{ConnectInfo, State};
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use protocol::packets::ServerMessage;
use std::net::SocketAddr;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use super::AppState;

/// Upgrade an HTTP request into a game connection.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    debug!("WebSocket upgrade from {}", addr);
    ws.on_upgrade(move |socket| handle_socket(socket, addr, state))
}

/// Drive one connection from session creation to removal.
///
/// The session is removed exactly once, on the single exit path of this
/// function, whatever ended the connection.
pub async fn handle_socket(socket: WebSocket, addr: SocketAddr, state: AppState) {
    let (mut write, mut read) = socket.split();

    // Subscribe before the session exists so the connect broadcast is seen.
    let mut frames = state.fanout.subscribe();

    let player_id = {
        let mut game = state.game.write().await;
        game.connect(addr)
    };

    let hello = ServerMessage::CurrentPlayer {
        player_id: player_id.to_string(),
    };
    let mut open = match hello.encode() {
        Ok(text) => match write.send(Message::Text(text.into())).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to send currentPlayer to {}: {}", addr, e);
                false
            }
        },
        Err(e) => {
            warn!("Failed to encode currentPlayer for {}: {}", addr, e);
            false
        }
    };

    while open {
        tokio::select! {
            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let mut game = state.game.write().await;
                        game.handle_message(&player_id, text.as_str());
                    }
                    Some(Ok(Message::Binary(data))) => {
                        warn!("Ignoring {} byte binary frame from {}", data.len(), addr);
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        open = false;
                    }
                    Some(Err(e)) => {
                        warn!("WebSocket error from {}: {}", addr, e);
                        open = false;
                    }
                    // Ping/pong are answered by the transport.
                    Some(Ok(_)) => {}
                }
            }
            frame = frames.recv() => {
                match frame {
                    Ok(frame) => {
                        if let Err(e) = write.send(Message::Text(frame)).await {
                            warn!("Failed to send to {}: {}", addr, e);
                            open = false;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Connection {} is slow, skipped {} frames", addr, skipped);
                    }
                    Err(RecvError::Closed) => {
                        open = false;
                    }
                }
            }
        }
    }

    let mut game = state.game.write().await;
    game.disconnect(&player_id);
    info!("Connection {} closed ({} players left)", addr, game.live_session_count());
}
