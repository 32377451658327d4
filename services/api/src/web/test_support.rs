//! Stub collaborators and state builders shared by the web task tests.

use crate::adapters::MockQuizAdapter;
use crate::config::Config;
use crate::web::protocol::ServerMessage;
use crate::web::state::{AppState, ConnectionState};
use async_trait::async_trait;
use quiz_core::{
    domain::Question,
    grading::LocalAnswerEvaluator,
    ports::{AnswerEvaluationService, DocumentTextService, PortError, PortResult},
    session::QuizSession,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};

pub struct StaticText;

#[async_trait]
impl DocumentTextService for StaticText {
    async fn extract_text(&self, _document: &[u8]) -> PortResult<String> {
        Ok("Paris is the capital of France.".to_string())
    }
}

/// Rejects every document as oversized.
pub struct TenPageText;

#[async_trait]
impl DocumentTextService for TenPageText {
    async fn extract_text(&self, _document: &[u8]) -> PortResult<String> {
        Err(PortError::TooManyPages { pages: 10, limit: 9 })
    }
}

/// Answers after a delay, with a fixed verdict.
pub struct SlowEvaluator {
    pub delay: Duration,
    pub verdict: bool,
}

#[async_trait]
impl AnswerEvaluationService for SlowEvaluator {
    async fn evaluate_answer(&self, _q: &str, _expected: &str, _given: &str) -> PortResult<bool> {
        tokio::time::sleep(self.delay).await;
        Ok(self.verdict)
    }
}

pub struct BrokenEvaluator;

#[async_trait]
impl AnswerEvaluationService for BrokenEvaluator {
    async fn evaluate_answer(&self, _q: &str, _expected: &str, _given: &str) -> PortResult<bool> {
        Err(PortError::Unexpected("connection refused".to_string()))
    }
}

pub fn test_config() -> Config {
    Config::from_lookup(|key| match key {
        "QUIZ_BACKEND" => Some("mock".to_string()),
        "ANSWER_EVALUATOR" => Some("local".to_string()),
        _ => None,
    })
    .expect("offline test config is valid")
}

pub fn app_state_with(evaluator: Arc<dyn AnswerEvaluationService>) -> Arc<AppState> {
    Arc::new(AppState {
        config: Arc::new(test_config()),
        text_source: Arc::new(StaticText),
        quiz_generator: Arc::new(MockQuizAdapter),
        answer_evaluator: evaluator,
    })
}

pub fn app_state() -> Arc<AppState> {
    app_state_with(Arc::new(LocalAnswerEvaluator))
}

/// A connection already holding a quiz over `questions`.
pub fn connection_with(questions: Vec<Question>) -> Arc<Mutex<ConnectionState>> {
    let mut conn = ConnectionState::new();
    conn.quiz = Some(QuizSession::new(questions).expect("test quiz is not empty"));
    conn.mode = crate::web::state::ConnectionMode::Quizzing;
    Arc::new(Mutex::new(conn))
}

pub fn outbox() -> (
    mpsc::UnboundedSender<ServerMessage>,
    mpsc::UnboundedReceiver<ServerMessage>,
) {
    mpsc::unbounded_channel()
}
