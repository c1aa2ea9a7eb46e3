use crate::gateway::{Dispatcher, GatewayEvent};
use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Debug, Serialize)]
struct ErrorFrame {
    ok: bool,
    error: String,
}

pub async fn handle_socket(socket: WebSocket, dispatcher: Arc<Dispatcher>) {
    let (mut sender, mut receiver) = socket.split();
    let (error_tx, mut error_rx) = mpsc::unbounded_channel::<String>();

    let send_task = tokio::spawn(async move {
        while let Some(payload) = error_rx.recv().await {
            if sender.send(Message::Text(payload)).await.is_err() {
                break;
            }
        }
    });

    tracing::info!("gateway bridge connected");
    while let Some(result) = receiver.next().await {
        let Ok(message) = result else { break };
        match message {
            Message::Text(text) => match serde_json::from_str::<GatewayEvent>(&text) {
                Ok(event) => dispatcher.dispatch(event),
                Err(error) => {
                    tracing::warn!(%error, "dropping malformed gateway frame");
                    let frame = ErrorFrame {
                        ok: false,
                        error: format!("invalid event: {error}"),
                    };
                    if let Ok(payload) = serde_json::to_string(&frame) {
                        let _ = error_tx.send(payload);
                    }
                }
            },
            Message::Close(_) => break,
            _ => {}
        }
    }

    tracing::info!("gateway bridge disconnected");
    drop(error_tx);
    send_task.abort();
}
