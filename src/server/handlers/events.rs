use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::Extension;
use axum::response::IntoResponse;
use futures::{sink::SinkExt, stream::StreamExt};
use tokio::sync::broadcast::error::RecvError;

use crate::auth::User;
use crate::realtime::Notifier;

/// Websocket fan-out. Each connected session receives every booking and
/// message mutation it is party to, in commit order. Delivery is advisory:
/// after a `resync` frame (or a reconnect) the client must re-fetch.
pub async fn subscribe(
    ws: WebSocketUpgrade,
    user: User,
    Extension(notifier): Extension<Notifier>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| stream_events(socket, user, notifier))
}

async fn stream_events(socket: WebSocket, user: User, notifier: Notifier) {
    let (mut sender, mut receiver) = socket.split();
    let mut events = notifier.subscribe();

    tracing::info!("events subscription opened for user {}", user.id);

    loop {
        tokio::select! {
            incoming = receiver.next() => match incoming {
                None | Some(Err(_)) | Some(Ok(Message::Close(_))) => break,
                // clients only listen on this socket
                Some(Ok(_)) => {}
            },
            event = events.recv() => match event {
                Ok(event) => {
                    if !event.concerns(user.id) {
                        continue;
                    }

                    let payload = match serde_json::to_string(&event) {
                        Ok(payload) => payload,
                        Err(err) => {
                            tracing::error!("failed to serialize event: {}", err);
                            continue;
                        }
                    };

                    if sender.send(Message::Text(payload)).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("subscriber for {} lagged by {} events", user.id, skipped);

                    let resync = serde_json::json!({ "type": "resync" }).to_string();

                    if sender.send(Message::Text(resync)).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Closed) => break,
            }
        }
    }

    tracing::info!("events subscription closed for user {}", user.id);
}
