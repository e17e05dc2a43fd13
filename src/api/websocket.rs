//! WebSocket Transport
//!
//! Binds an authenticated identity to each connection and shuttles protocol
//! events: inbound intents go to the engine, outbound envelopes come off the
//! notifier's broadcast channel filtered by recipient.

use super::errors::ApiError;
use super::handlers::AppState;
use super::middleware::RequestId;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::{IntoResponse, Response},
    Extension,
};
use crate::events::{ClientEvent, ServerEvent};
use crate::games::FlipEngine;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct WsAuthQuery {
    pub token: String,
}

/// WebSocket endpoint handler. Unknown tokens are rejected explicitly with
/// 401 rather than silently dropped.
/// GET /ws?token={session}
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<WsAuthQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let Some(username) = state.session_user(&params.token) else {
        return ApiError::unauthorized(request_id.0, "unknown session token".to_string())
            .into_response();
    };

    ws.on_upgrade(move |socket| handle_connection(socket, username, state))
}

async fn handle_connection(socket: WebSocket, username: String, state: Arc<AppState>) {
    let connection_id = Uuid::new_v4();
    let snapshot = match state.engine.connect(&username, connection_id) {
        Ok(snapshot) => snapshot,
        Err(err) => {
            warn!(%username, %err, "connection rejected");
            return;
        }
    };
    info!(%username, %connection_id, "client connected");

    let (mut sender, mut receiver) = socket.split();

    // Greeting goes straight to this socket, ahead of any broadcast traffic.
    let greeting = ServerEvent::AuthSuccess {
        username: username.clone(),
        balance: snapshot.balance,
        skins: snapshot.skins,
    };
    let greeting = match serde_json::to_string(&greeting) {
        Ok(text) => text,
        Err(err) => {
            error!(%username, %err, "failed to serialize greeting");
            state.engine.disconnect(&username, connection_id);
            return;
        }
    };
    if sender.send(Message::Text(greeting)).await.is_err() {
        state.engine.disconnect(&username, connection_id);
        return;
    }

    let mut rx = state.engine.notifier().subscribe();
    let send_user = username.clone();
    let mut send_task = tokio::spawn(async move {
        while let Ok(envelope) = rx.recv().await {
            if !envelope.is_for(&send_user) {
                continue;
            }
            let message = match serde_json::to_string(&envelope.event) {
                Ok(text) => Message::Text(text),
                Err(err) => {
                    error!(%err, "failed to serialize event");
                    continue;
                }
            };
            if sender.send(message).await.is_err() {
                debug!(username = %send_user, "client send failed; closing");
                break;
            }
        }
    });

    let recv_engine = state.engine.clone();
    let recv_user = username.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(message) = receiver.next().await {
            match message {
                Ok(Message::Text(text)) => dispatch(&recv_engine, &recv_user, &text),
                Ok(Message::Close(_)) => {
                    debug!(username = %recv_user, "client requested close");
                    break;
                }
                Ok(_) => {}
                Err(err) => {
                    warn!(username = %recv_user, %err, "websocket error");
                    break;
                }
            }
        }
    });

    // Whichever task ends first, the other must not outlive the connection;
    // a lingering send task would keep holding a broadcast receiver.
    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    state.engine.disconnect(&username, connection_id);
    info!(%username, %connection_id, "client disconnected");
}

/// Route one inbound intent to the engine. Failures are pushed back to the
/// issuing connection; join failures use the dedicated `join_error` event.
fn dispatch(engine: &Arc<FlipEngine>, username: &str, text: &str) {
    let event: ClientEvent = match serde_json::from_str(text) {
        Ok(event) => event,
        Err(err) => {
            engine.notifier().send_to(
                username,
                ServerEvent::Error {
                    message: format!("malformed event: {err}"),
                },
            );
            return;
        }
    };

    match event {
        ClientEvent::CreateGame { choice, wager } => {
            if let Err(err) = engine.create_game(username, choice, wager) {
                engine.notifier().send_to(
                    username,
                    ServerEvent::Error {
                        message: err.to_string(),
                    },
                );
            }
        }
        ClientEvent::JoinGame {
            game_id,
            choice,
            wager,
        } => {
            if let Err(err) = engine.join_game(username, game_id, choice, wager) {
                engine.notifier().send_to(
                    username,
                    ServerEvent::JoinError {
                        message: err.to_string(),
                    },
                );
            }
        }
        ClientEvent::GetGameList => {
            engine.notifier().send_to(
                username,
                ServerEvent::GameListUpdate {
                    games: engine.waiting_games(),
                },
            );
        }
        ClientEvent::ChatMessage { message } => engine.chat(username, message),
    }
}
