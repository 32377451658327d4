//! services/api/src/web/state.rs
//!
//! Defines the application's shared and connection-specific states.

use crate::config::Config;
use crate::web::protocol::ServerMessage;
use quiz_core::{
    domain::{GenerateQuizOptions, Question},
    ports::{
        AnswerEvaluationService, DocumentTextService, PortError, PortResult,
        QuizGenerationService,
    },
    session::QuizSession,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

//=========================================================================================
// AppState (Shared Across All Connections)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub text_source: Arc<dyn DocumentTextService>,
    pub quiz_generator: Arc<dyn QuizGenerationService>,
    pub answer_evaluator: Arc<dyn AnswerEvaluationService>,
}

impl AppState {
    /// Extracts the document text and generates a quiz from it within the generation timeout.
    pub async fn generate_quiz_from_document(
        &self,
        document: &[u8],
        options: GenerateQuizOptions,
    ) -> PortResult<Vec<Question>> {
        let work = async {
            let text = self.text_source.extract_text(document).await?;
            if text.trim().is_empty() {
                return Err(PortError::InvalidDocument(
                    "PDF contains no extractable text".to_string(),
                ));
            }
            self.quiz_generator.generate_quiz(&text, options).await
        };

        tokio::time::timeout(self.config.generation_timeout, work)
            .await
            .map_err(|_| {
                PortError::TimedOut(format!(
                    "quiz generation took longer than {:?}",
                    self.config.generation_timeout
                ))
            })?
    }

    /// Grades an open answer within the evaluation timeout.
    pub async fn evaluate_answer(
        &self,
        question_text: &str,
        correct_answer: &str,
        user_answer: &str,
    ) -> PortResult<bool> {
        let work = self
            .answer_evaluator
            .evaluate_answer(question_text, correct_answer, user_answer);

        tokio::time::timeout(self.config.evaluation_timeout, work)
            .await
            .map_err(|_| {
                PortError::TimedOut(format!(
                    "answer evaluation took longer than {:?}",
                    self.config.evaluation_timeout
                ))
            })?
    }
}

//=========================================================================================
// ConnectionState (Specific to One WebSocket Connection)
//=========================================================================================

/// The outbound half of a connection. Messages are serialized by the writer task.
pub type Outbox = mpsc::UnboundedSender<ServerMessage>;

/// Queues a message for the client; a closed connection is only logged.
pub fn send(outbox: &Outbox, message: ServerMessage) {
    if outbox.send(message).is_err() {
        warn!("Client outbox is closed; dropping message.");
    }
}

/// An enum representing what the connection is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionMode {
    Idle,
    Uploading,
    Generating,
    Quizzing,
}

/// The state for a single, active WebSocket connection.
pub struct ConnectionState {
    pub mode: ConnectionMode,
    pub upload_buffer: Vec<u8>,
    pub upload_options: GenerateQuizOptions,
    pub quiz: Option<QuizSession>,
    /// Bumped by every reset. Results computed for an older epoch are discarded.
    pub epoch: u64,
    /// Cancels the pending delayed advance, if any.
    pub advance_token: CancellationToken,
}

impl ConnectionState {
    pub fn new() -> Self {
        Self {
            mode: ConnectionMode::Idle,
            upload_buffer: Vec::new(),
            upload_options: GenerateQuizOptions::default(),
            quiz: None,
            epoch: 0,
            advance_token: CancellationToken::new(),
        }
    }

    /// Discards the quiz and any upload, cancelling the pending advance.
    pub fn reset(&mut self) {
        self.epoch += 1;
        self.advance_token.cancel();
        self.advance_token = CancellationToken::new();
        self.quiz = None;
        self.upload_buffer.clear();
        self.mode = ConnectionMode::Idle;
    }
}

impl Default for ConnectionState {
    fn default() -> Self {
        Self::new()
    }
}
