//! services/api/src/web/generation_task.rs
//!
//! This module contains the asynchronous "worker" function that turns an uploaded
//! document into a quiz session for one connection.

use crate::web::{
    protocol::ServerMessage,
    quiz_task::question_message,
    state::{send, AppState, ConnectionMode, ConnectionState, Outbox},
};
use quiz_core::{
    domain::GenerateQuizOptions,
    ports::{PortError, PortResult},
    session::QuizSession,
};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::info;

/// Extracts the document, generates a quiz and installs it as the connection's session.
///
/// `epoch` is the connection epoch the upload belongs to; if the connection was reset
/// while the generator was running, the result is dropped. Failures are reported to
/// the client and returned for logging.
pub async fn generation_process(
    app_state: Arc<AppState>,
    conn_lock: Arc<Mutex<ConnectionState>>,
    outbox: Outbox,
    epoch: u64,
    document: Vec<u8>,
    options: GenerateQuizOptions,
) -> PortResult<()> {
    let start_time = Instant::now();
    info!("Generation process started for a {} byte document.", document.len());
    send(&outbox, ServerMessage::GeneratingQuiz);

    let result = app_state
        .generate_quiz_from_document(&document, options)
        .await
        .and_then(|questions| {
            QuizSession::new(questions)
                .map_err(|e| PortError::MalformedResponse(e.to_string()))
        });
    info!("⏱️ Quiz generation took: {:?}", start_time.elapsed());

    let mut conn = conn_lock.lock().await;
    if conn.epoch != epoch {
        info!("Discarding generated quiz for an upload that was superseded.");
        return Ok(());
    }

    match result {
        Ok(session) => {
            info!("Quiz {} ready with {} questions.", session.id(), session.total());
            if let Some(message) = question_message(&session) {
                send(&outbox, message);
            }
            conn.quiz = Some(session);
            conn.mode = ConnectionMode::Quizzing;
            Ok(())
        }
        Err(e) => {
            conn.mode = ConnectionMode::Idle;
            send(
                &outbox,
                ServerMessage::Error {
                    message: e.to_string(),
                },
            );
            Err(e)
        }
    }
}
