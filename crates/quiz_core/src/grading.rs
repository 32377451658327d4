//! crates/quiz_core/src/grading.rs
//!
//! Local answer comparison, used for multiple-choice grading and as the offline
//! `AnswerEvaluationService`.

use async_trait::async_trait;

use crate::ports::{AnswerEvaluationService, PortResult};

/// Multiple-choice grading: case-sensitive exact match.
pub fn option_matches(correct_answer: &str, selected: &str) -> bool {
    selected == correct_answer
}

/// Open-answer fallback grading: case-insensitive and whitespace-trimmed.
pub fn answers_match(correct_answer: &str, given: &str) -> bool {
    correct_answer.trim().to_lowercase() == given.trim().to_lowercase()
}

/// An evaluator that never leaves the process.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalAnswerEvaluator;

#[async_trait]
impl AnswerEvaluationService for LocalAnswerEvaluator {
    async fn evaluate_answer(
        &self,
        _question_text: &str,
        correct_answer: &str,
        user_answer: &str,
    ) -> PortResult<bool> {
        Ok(answers_match(correct_answer, user_answer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_match_is_case_sensitive() {
        assert!(option_matches("Paris", "Paris"));
        assert!(!option_matches("Paris", "paris"));
        assert!(!option_matches("Paris", "Paris "));
    }

    #[test]
    fn open_answer_match_ignores_case_and_padding() {
        assert!(answers_match("paris", "  Paris "));
        assert!(answers_match("Blue Whale", "blue whale"));
        assert!(!answers_match("H2O", "water"));
    }

    #[tokio::test]
    async fn local_evaluator_uses_fallback_comparison() {
        let evaluator = LocalAnswerEvaluator;
        let correct = evaluator
            .evaluate_answer("Capital of France?", "paris", "  Paris ")
            .await
            .unwrap();
        let wrong = evaluator
            .evaluate_answer("Capital of France?", "paris", "Lyon")
            .await
            .unwrap();
        assert!(correct);
        assert!(!wrong);
    }
}
