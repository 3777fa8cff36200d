//! WebSocket endpoint pushing room-scoped refresh events.
//!
//! Clients hold one connection open and re-fetch whatever an event names.
//! The payload is a plain `{"event": "..."}` hint; authoritative state
//! always comes from the REST endpoints.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum_extra::extract::cookie::CookieJar;
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use crate::auth::jwt::{jwt_secret, verify_token};
use crate::error::AppError;
use crate::middleware::auth::SESSION_COOKIE;
use crate::notify::Room;
use crate::state::AppState;

// GET /api/events — upgrade to WebSocket
pub async fn events_ws(
    State(state): State<AppState>,
    jar: CookieJar,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, AppError> {
    let token = jar
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or_else(|| AppError::unauthorized("Unauthorized"))?;
    let claims = verify_token(&token, &jwt_secret())?;

    let room = if claims.role == "admin" {
        Room::Admin
    } else {
        Room::Reseller(claims.sub)
    };

    Ok(ws.on_upgrade(move |socket| event_session(socket, state, room)))
}

async fn event_session(socket: WebSocket, state: AppState, room: Room) {
    tracing::debug!(?room, "Event stream connected");

    let (mut sink, mut stream) = socket.split();
    let mut rx = state.events.subscribe();

    loop {
        tokio::select! {
            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        if sink.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    _ => {} // Text, Binary, Pong — ignore
                }
            }

            event = rx.recv() => {
                match event {
                    Ok(n) if n.room == room => {
                        let payload = serde_json::json!({ "event": n.event }).to_string();
                        if sink.send(Message::Text(payload.into())).await.is_err() {
                            break;
                        }
                    }
                    Ok(_) => {} // another room
                    // Events are only re-poll hints; a skipped backlog is harmless.
                    Err(broadcast::error::RecvError::Lagged(_)) => {}
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    let _ = sink.close().await;
    tracing::debug!(?room, "Event stream closed");
}
