//! services/api/src/adapters/mock.rs
//!
//! An offline `QuizGenerationService` that always returns the same short quiz.
//! Used for local development without an API key and throughout the tests.

use async_trait::async_trait;
use quiz_core::{
    domain::{GenerateQuizOptions, Question},
    ports::{PortResult, QuizGenerationService},
};

#[derive(Clone, Copy, Debug, Default)]
pub struct MockQuizAdapter;

impl MockQuizAdapter {
    pub fn questions() -> Vec<Question> {
        let options = |items: [&str; 4]| -> Vec<String> { items.iter().map(|s| s.to_string()).collect() };
        vec![
            Question::multiple_choice(
                "What is the capital of France?",
                options(["London", "Berlin", "Paris", "Madrid"]),
                "Paris",
            ),
            Question::multiple_choice(
                "Which planet is known as the Red Planet?",
                options(["Venus", "Mars", "Jupiter", "Saturn"]),
                "Mars",
            ),
            Question::open_answer("What is the chemical symbol for water?", "H2O"),
            Question::multiple_choice(
                "Who painted the Mona Lisa?",
                options(["Van Gogh", "Da Vinci", "Picasso", "Rembrandt"]),
                "Da Vinci",
            ),
            Question::open_answer("What is the largest mammal in the world?", "Blue Whale"),
        ]
    }
}

#[async_trait]
impl QuizGenerationService for MockQuizAdapter {
    /// Ignores the text. Open-answer questions are dropped unless requested.
    async fn generate_quiz(
        &self,
        _text: &str,
        options: GenerateQuizOptions,
    ) -> PortResult<Vec<Question>> {
        Ok(Self::questions()
            .into_iter()
            .filter(|question| options.include_open_answer || !question.is_open_answer())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn honours_open_answer_option() {
        let mixed = MockQuizAdapter
            .generate_quiz("", GenerateQuizOptions { include_open_answer: true })
            .await
            .unwrap();
        let closed = MockQuizAdapter
            .generate_quiz("", GenerateQuizOptions::default())
            .await
            .unwrap();
        assert_eq!(mixed.len(), 5);
        assert_eq!(closed.len(), 3);
        assert!(closed.iter().all(|q| !q.is_open_answer()));
    }
}
