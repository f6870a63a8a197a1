//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::{domain::OUTBOUND_QUEUE_CAPACITY, ui::state::AppState};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns a task that receives messages from the rx channel and pushes them to the WebSocket sender.
///
/// This function handles the outbound message flow: every frame the broker queues for this
/// connection (replies and broadcasts) is written to the socket in queue order.
///
/// # Arguments
///
/// * `rx` - Channel receiver for outbound frames
/// * `sender` - WebSocket sink to send messages to this client
///
/// # Returns
///
/// A `JoinHandle` for the spawned task
fn pusher_loop(
    mut rx: mpsc::Receiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (sender, mut receiver) = socket.split();

    // Create a channel for this connection to receive outbound frames
    let (tx, rx) = mpsc::channel(OUTBOUND_QUEUE_CAPACITY);
    let connection_id = state.broker.connect(tx).await;

    let connection_id_clone = connection_id.clone();
    let state_clone = state.clone();

    // Inbound frames are handled one at a time, in arrival order
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!("WebSocket error on '{}': {}", connection_id_clone, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    tracing::debug!("Received text from '{}': {}", connection_id_clone, text);
                    state_clone
                        .broker
                        .handle_frame(&connection_id_clone, text.as_str())
                        .await;
                }
                Message::Binary(bytes) => match std::str::from_utf8(&bytes) {
                    Ok(text) => {
                        state_clone
                            .broker
                            .handle_frame(&connection_id_clone, text)
                            .await;
                    }
                    Err(e) => {
                        tracing::warn!(
                            "Dropping non UTF-8 binary frame from '{}': {}",
                            connection_id_clone,
                            e
                        );
                    }
                },
                Message::Ping(_) => {
                    // Ping/pong is handled automatically by the WebSocket protocol
                    tracing::debug!("Received ping");
                }
                Message::Close(_) => {
                    tracing::info!("Client '{}' requested close", connection_id_clone);
                    break;
                }
                _ => {}
            }
        }
    });

    let mut send_task = pusher_loop(rx, sender);

    // If any one of the tasks completes, abort the other and wait until it has stopped,
    // so no inbound frame is still being handled when the connection is retired
    tokio::select! {
        _ = &mut recv_task => {
            send_task.abort();
            let _ = send_task.await;
        },
        _ = &mut send_task => {
            recv_task.abort();
            let _ = recv_task.await;
        },
    };

    state.broker.disconnect(&connection_id).await;
}
