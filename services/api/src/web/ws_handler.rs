//! services/api/src/web/ws_handler.rs
//!
//! This is the main entry point and control loop for a WebSocket connection.
//! It owns the connection's quiz state and delegates grading and generation to tasks.

use crate::web::{
    generation_task::generation_process,
    protocol::{ClientMessage, ServerMessage},
    quiz_task::submit_answer,
    state::{send, AppState, ConnectionMode, ConnectionState, Outbox},
};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{error, info, warn};

/// The handler for upgrading HTTP requests to WebSocket connections.
pub async fn ws_handler(ws: WebSocketUpgrade, State(app_state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, app_state))
}

async fn handle_socket(socket: WebSocket, app_state: Arc<AppState>) {
    info!("New WebSocket connection established.");

    // Every task writes through the outbox; one writer owns the sink.
    let (mut sender, mut receiver) = socket.split();
    let (outbox, mut outbox_rx) = mpsc::unbounded_channel::<ServerMessage>();
    let writer = tokio::spawn(async move {
        while let Some(message) = outbox_rx.recv().await {
            let json = match serde_json::to_string(&message) {
                Ok(json) => json,
                Err(e) => {
                    error!("Failed to serialize server message: {}", e);
                    continue;
                }
            };
            if sender.send(Message::Text(json.into())).await.is_err() {
                warn!("Failed to send message; client may have disconnected.");
                break;
            }
        }
    });

    let conn_lock = Arc::new(Mutex::new(ConnectionState::new()));

    // --- Main Message Loop ---
    loop {
        if let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => {
                    handle_text_message(text.to_string(), &app_state, &conn_lock, &outbox).await;
                }
                Message::Binary(data) => {
                    handle_binary_message(&data, &app_state, &conn_lock, &outbox).await;
                }
                Message::Close(_) => {
                    info!("Client sent close message.");
                    break;
                }
                _ => {}
            }
        } else {
            info!("Client disconnected.");
            break;
        }
    }

    // --- Cleanup ---
    conn_lock.lock().await.reset();
    writer.abort();
    info!("WebSocket connection closed.");
}

/// Appends a document chunk to the upload in progress.
async fn handle_binary_message(
    data: &[u8],
    app_state: &AppState,
    conn_lock: &Mutex<ConnectionState>,
    outbox: &Outbox,
) {
    let mut conn = conn_lock.lock().await;
    if conn.mode != ConnectionMode::Uploading {
        warn!("Binary frame received outside of an upload; ignoring.");
        return;
    }
    if conn.upload_buffer.len() + data.len() > app_state.config.max_upload_bytes {
        conn.reset();
        send(
            outbox,
            ServerMessage::Error {
                message: "Document exceeds the upload size limit.".to_string(),
            },
        );
        return;
    }
    conn.upload_buffer.extend_from_slice(data);
}

/// Helper function to handle the logic for different `ClientMessage` variants.
async fn handle_text_message(
    text: String,
    app_state: &Arc<AppState>,
    conn_lock: &Arc<Mutex<ConnectionState>>,
    outbox: &Outbox,
) {
    let client_msg = match serde_json::from_str::<ClientMessage>(&text) {
        Ok(client_msg) => client_msg,
        Err(e) => {
            warn!("Failed to deserialize client message: {}", e);
            return;
        }
    };

    match client_msg {
        ClientMessage::BeginUpload { include_open_answer } => {
            info!("BeginUpload received; discarding any current quiz.");
            let mut conn = conn_lock.lock().await;
            conn.reset();
            conn.mode = ConnectionMode::Uploading;
            conn.upload_options.include_open_answer = include_open_answer;
        }
        ClientMessage::EndUpload => {
            let mut conn = conn_lock.lock().await;
            if conn.mode != ConnectionMode::Uploading {
                warn!("EndUpload received without a BeginUpload; ignoring.");
                return;
            }
            let document = std::mem::take(&mut conn.upload_buffer);
            info!("EndUpload received with {} bytes.", document.len());
            conn.mode = ConnectionMode::Generating;

            let app_state = app_state.clone();
            let conn_lock = conn_lock.clone();
            let outbox = outbox.clone();
            let epoch = conn.epoch;
            let options = conn.upload_options;
            tokio::spawn(async move {
                if let Err(e) =
                    generation_process(app_state, conn_lock, outbox, epoch, document, options).await
                {
                    error!("Generation process failed: {:?}", e);
                }
            });
        }
        ClientMessage::SelectAnswer { value } => {
            let mut conn = conn_lock.lock().await;
            match conn.quiz.as_mut() {
                Some(quiz) => {
                    if let Err(e) = quiz.select_answer(value) {
                        warn!("SelectAnswer ignored: {}", e);
                    }
                }
                None => warn!("SelectAnswer received without an active quiz."),
            }
        }
        ClientMessage::SubmitAnswer => {
            // An open-answer evaluation keeps running detached so a Reset can still be read.
            submit_answer(app_state, conn_lock, outbox).await;
        }
        ClientMessage::Reset => {
            info!("Reset received.");
            conn_lock.lock().await.reset();
            send(outbox, ServerMessage::SessionReset);
        }
    }
}
