//! crates/quiz_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the external collaborators.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the PDF library and the hosted model behind them.

use async_trait::async_trait;

use crate::domain::{GenerateQuizOptions, Question};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (PDF parser, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
    #[error("PDF has {pages} pages, at most {limit} are accepted")]
    TooManyPages { pages: usize, limit: usize },
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
    #[error("Timed out: {0}")]
    TimedOut(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DocumentTextService: Send + Sync {
    /// Extracts plain text from an uploaded document, or rejects it.
    async fn extract_text(&self, document: &[u8]) -> PortResult<String>;
}

#[async_trait]
pub trait QuizGenerationService: Send + Sync {
    /// Generates an ordered, non-empty list of questions from the given text.
    async fn generate_quiz(
        &self,
        text: &str,
        options: GenerateQuizOptions,
    ) -> PortResult<Vec<Question>>;
}

#[async_trait]
pub trait AnswerEvaluationService: Send + Sync {
    /// Decides whether `user_answer` is an acceptable answer to the question.
    async fn evaluate_answer(
        &self,
        question_text: &str,
        correct_answer: &str,
        user_answer: &str,
    ) -> PortResult<bool>;
}
