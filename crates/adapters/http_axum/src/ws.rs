//! Thermometer WebSocket.
//!
//! Each connection listens on the notification bus and forwards every
//! notification to its client. Text frames from the client are decoded as
//! wire messages and handed to the device service; a rejected message is
//! answered with an `{"error": …}` frame to that client only.

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::broadcast::error::RecvError;

use homesim_app::ports::NotificationPublisher;
use homesim_domain::id::ConnectionId;

use crate::state::AppState;
use crate::wire::OutboundMessage;

/// `GET /ws`
pub async fn upgrade<P>(ws: WebSocketUpgrade, State(state): State<AppState<P>>) -> Response
where
    P: NotificationPublisher + Send + Sync + 'static,
{
    ws.on_upgrade(move |socket| serve(socket, state))
}

async fn serve<P>(socket: WebSocket, state: AppState<P>)
where
    P: NotificationPublisher + Send + Sync + 'static,
{
    let (sender, receiver) = socket.split();
    run(sender, receiver, state).await;
}

/// Drive one connection until either side goes away.
#[tracing::instrument(skip_all, fields(connection = %ConnectionId::new()))]
async fn run<P, S, R, E>(mut sender: S, mut receiver: R, state: AppState<P>)
where
    P: NotificationPublisher + Send + Sync + 'static,
    S: Sink<Message> + Unpin,
    R: Stream<Item = Result<Message, E>> + Unpin,
    E: std::fmt::Display,
{
    tracing::info!("websocket connected");

    let mut notifications = state.notifications.subscribe();

    loop {
        tokio::select! {
            notification = notifications.recv() => match notification {
                Ok(notification) => {
                    if !deliver(&mut sender, &OutboundMessage::from(notification)).await {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "websocket client lagged, some notifications were dropped");
                }
                Err(RecvError::Closed) => break,
            },
            inbound = receiver.next() => match inbound {
                Some(Ok(Message::Text(text))) => {
                    if let Err(err) = state.devices.handle_message(text.as_str()).await {
                        let reply = OutboundMessage::error(error_message(&err));
                        if !deliver(&mut sender, &reply).await {
                            break;
                        }
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    tracing::warn!(error = %err, "websocket receive failed");
                    break;
                }
            },
        }
    }

    drop(notifications);
    if state.notifications.listeners() == 0 {
        // last client gone: stop re-emitting into the void
        state.thermometer.shutdown().await;
    }
    tracing::info!("websocket disconnected");
}

/// Returns `false` once the client can no longer be reached.
async fn deliver<S>(sender: &mut S, message: &OutboundMessage) -> bool
where
    S: Sink<Message> + Unpin,
{
    let json = match serde_json::to_string(message) {
        Ok(json) => json,
        Err(err) => {
            tracing::warn!(%err, "failed to serialize websocket message");
            return true;
        }
    };
    if sender.send(Message::Text(json.into())).await.is_err() {
        tracing::debug!("websocket client went away while sending");
        return false;
    }
    true
}

/// Text sent back for a rejected inbound message.
fn error_message(err: &homesim_domain::error::HomeSimError) -> String {
    use std::error::Error as _;

    match err.source() {
        Some(source) => source.to_string(),
        None => err.to_string(),
    }
}
