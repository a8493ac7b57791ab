use axum::{
    extract::{Extension, Query, ws::{Message, WebSocket, WebSocketUpgrade}},
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, error, info, warn};

use crate::dto::event_dto::AuctionEvent;

pub type EventSender = broadcast::Sender<AuctionEvent>;

/// Hands an event to every live subscriber. A send with nobody listening is
/// logged, not treated as a failure of the operation that produced it.
pub fn publish(tx: &EventSender, event: AuctionEvent) {
    let auction_id = event.auction_id();
    match tx.send(event) {
        Ok(receivers) => debug!(auction_id, receivers, "Published auction event."),
        Err(_) => debug!(auction_id, "No subscribers for auction event."),
    }
}

#[derive(Debug, Deserialize)]
pub struct StreamParams {
    pub auction_id: Option<i64>,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<StreamParams>,
    Extension(tx): Extension<EventSender>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, tx, params.auction_id))
}

async fn handle_socket(socket: WebSocket, tx: EventSender, auction_id: Option<i64>) {
    let (mut sender, mut receiver) = socket.split();
    let mut rx = tx.subscribe();
    info!(?auction_id, "Websocket subscriber connected.");

    // Task to send events to this client
    let mut send_task = tokio::spawn(async move {
        loop {
            let event = match rx.recv().await {
                Ok(event) => event,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Websocket subscriber fell behind; events dropped.");
                    continue;
                }
                Err(RecvError::Closed) => break,
            };

            if auction_id.is_some_and(|id| id != event.auction_id()) {
                continue;
            }

            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(e) => {
                    error!("Failed to serialize auction event: {}", e);
                    continue;
                }
            };

            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    // The stream is one-way; client frames are only read to notice a close.
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(message)) = receiver.next().await {
            if let Message::Close(_) = message {
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }
    info!(?auction_id, "Websocket subscriber disconnected.");
}
