//! services/api/src/adapters/quiz_llm.rs
//!
//! This module contains the adapter for the quiz-generating LLM.
//! It implements the `QuizGenerationService` port from the `core` crate.

const SYSTEM_INSTRUCTIONS: &str = "You are a quiz generator.";

const USER_INPUT_TEMPLATE: &str = r#"Generate {count} quiz questions based on the following text:
{content}
Each question should have:
- A question text
- A type: "multiple-choice" or "short-answer"
- If multiple-choice: 4 options and one correct answer, copied exactly from the options
- If short-answer: a single correct answer
{mix}
Return the result as a JSON array with each question like:
[
  {
    "type": "multiple-choice",
    "question": "...",
    "options": ["...", "...", "...", "..."],
    "answer": "..."
  },
  {
    "type": "short-answer",
    "question": "...",
    "answer": "..."
  }
]
Only output JSON."#;

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client, error::OpenAIError,
};
use async_trait::async_trait;
use quiz_core::{
    domain::{GenerateQuizOptions, Question},
    generation::parse_questions,
    ports::{PortError, PortResult, QuizGenerationService},
};
use tracing::info;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `QuizGenerationService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiQuizAdapter {
    client: Client<OpenAIConfig>,
    model: String,
    question_count: usize,
}

impl OpenAiQuizAdapter {
    /// Creates a new `OpenAiQuizAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String, question_count: usize) -> Self {
        Self {
            client,
            model,
            question_count,
        }
    }
}

/// Fills the generation prompt for the given document text.
pub fn build_prompt(content: &str, question_count: usize, options: GenerateQuizOptions) -> String {
    let mix = if options.include_open_answer {
        "Mix multiple-choice and short-answer questions."
    } else {
        "Only generate multiple-choice questions."
    };
    USER_INPUT_TEMPLATE
        .replace("{count}", &question_count.to_string())
        .replace("{mix}", mix)
        .replace("{content}", content)
}

//=========================================================================================
// `QuizGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl QuizGenerationService for OpenAiQuizAdapter {
    /// Asks the model for a quiz and validates its JSON reply.
    async fn generate_quiz(
        &self,
        text: &str,
        options: GenerateQuizOptions,
    ) -> PortResult<Vec<Question>> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_INSTRUCTIONS)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(build_prompt(text, self.question_count, options))
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(0.7)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        let raw = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                PortError::MalformedResponse(
                    "Quiz generation LLM response contained no text content.".to_string(),
                )
            })?;

        let questions = parse_questions(&raw)?;
        info!("Generated {} questions with {}.", questions.len(), self.model);
        Ok(questions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_restricts_to_multiple_choice_by_default() {
        let prompt = build_prompt("Photosynthesis converts light.", 5, GenerateQuizOptions::default());
        assert!(prompt.starts_with("Generate 5 quiz questions"));
        assert!(prompt.contains("Photosynthesis converts light."));
        assert!(prompt.contains("Only generate multiple-choice questions."));
        assert!(prompt.ends_with("Only output JSON."));
    }

    #[test]
    fn prompt_mixes_in_short_answers_when_asked() {
        let options = GenerateQuizOptions {
            include_open_answer: true,
        };
        let prompt = build_prompt("text", 3, options);
        assert!(prompt.contains("Generate 3 quiz questions"));
        assert!(prompt.contains("Mix multiple-choice and short-answer questions."));
    }

    #[test]
    fn document_text_is_not_reinterpreted() {
        let prompt = build_prompt("literal {mix} and {count}", 5, GenerateQuizOptions::default());
        assert!(prompt.contains("literal {mix} and {count}"));
    }
}
