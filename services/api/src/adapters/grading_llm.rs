//! services/api/src/adapters/grading_llm.rs
//!
//! This module contains the adapter for the answer-grading LLM.
//! It implements the `AnswerEvaluationService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client, error::OpenAIError,
};
use async_trait::async_trait;
use quiz_core::ports::{AnswerEvaluationService, PortError, PortResult};

const SYSTEM_INSTRUCTIONS: &str =
    "You are a helpful assistant that evaluates short answer quiz responses.";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `AnswerEvaluationService` by asking an LLM for a verdict.
#[derive(Clone)]
pub struct OpenAiGradingAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiGradingAdapter {
    /// Creates a new `OpenAiGradingAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

fn build_prompt(question: &str, expected_answer: &str, user_answer: &str) -> String {
    format!(
        "You are a quiz evaluator. Given a question, the expected correct answer, and the user's answer, \
return ONLY 1 if the user's answer is correct or 0 if incorrect. Do not include any explanation or text, only a single number.\n\
Question: {}\n\
Expected Answer: {}\n\
User's Answer: {}\n\
Respond with 1 for correct, or 0 for incorrect.",
        question, expected_answer, user_answer
    )
}

/// Reads the model's single-digit verdict.
pub fn parse_verdict(reply: &str) -> PortResult<bool> {
    match reply.trim() {
        "1" => Ok(true),
        "0" => Ok(false),
        other => Err(PortError::MalformedResponse(format!(
            "expected a 1 or 0 verdict, got '{}'",
            other
        ))),
    }
}

//=========================================================================================
// `AnswerEvaluationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl AnswerEvaluationService for OpenAiGradingAdapter {
    async fn evaluate_answer(
        &self,
        question_text: &str,
        correct_answer: &str,
        user_answer: &str,
    ) -> PortResult<bool> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_INSTRUCTIONS)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(build_prompt(question_text, correct_answer, user_answer))
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(0.0)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        if let Some(choice) = response.choices.into_iter().next() {
            if let Some(content) = choice.message.content {
                parse_verdict(&content)
            } else {
                Err(PortError::MalformedResponse(
                    "Grading LLM response contained no text content.".to_string(),
                ))
            }
        } else {
            Err(PortError::MalformedResponse(
                "Grading LLM returned no choices in its response.".to_string(),
            ))
        }
    }
}
