//! crates/quiz_core/src/generation.rs
//!
//! Structural validation of quiz generator output.
//!
//! The model's reply is an untrusted payload: it may be wrapped in markdown code
//! fences, and any entry may be missing fields or carry an unknown type. A batch
//! is either fully valid or rejected as a whole.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::domain::Question;
use crate::ports::{PortError, PortResult};

static OPENING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^```[\w-]*").expect("opening fence pattern is valid"));

/// One question as the model writes it.
#[derive(Debug, Deserialize)]
struct RawQuestion {
    #[serde(rename = "type")]
    kind: String,
    question: String,
    answer: String,
    #[serde(default)]
    options: Option<Vec<String>>,
}

/// Removes a leading ```` ```json ```` (or bare ```` ``` ````) marker and a trailing
/// ```` ``` ```` marker, along with the surrounding whitespace.
pub fn strip_code_fence(raw: &str) -> &str {
    let mut body = raw.trim();
    if let Some(fence) = OPENING_FENCE.find(body) {
        body = &body[fence.end()..];
    }
    body = body.strip_suffix("```").unwrap_or(body);
    body.trim()
}

/// Parses and validates a generator reply into questions.
pub fn parse_questions(raw: &str) -> PortResult<Vec<Question>> {
    let body = strip_code_fence(raw);
    let entries: Vec<RawQuestion> = serde_json::from_str(body)
        .map_err(|e| PortError::MalformedResponse(format!("quiz is not a JSON array of questions: {}", e)))?;

    if entries.is_empty() {
        return Err(PortError::MalformedResponse(
            "quiz contains no questions".to_string(),
        ));
    }

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| validate(entry).map_err(|reason| {
            PortError::MalformedResponse(format!("question {}: {}", index + 1, reason))
        }))
        .collect()
}

fn validate(entry: RawQuestion) -> Result<Question, String> {
    if entry.question.trim().is_empty() {
        return Err("question text is empty".to_string());
    }
    if entry.answer.trim().is_empty() {
        return Err("answer is empty".to_string());
    }

    match entry.kind.as_str() {
        "multiple-choice" => {
            let options = entry
                .options
                .filter(|options| !options.is_empty())
                .ok_or_else(|| "multiple-choice question has no options".to_string())?;
            if !options.iter().any(|option| *option == entry.answer) {
                return Err(format!(
                    "answer '{}' is not one of the options",
                    entry.answer
                ));
            }
            Ok(Question::multiple_choice(entry.question, options, entry.answer))
        }
        "short-answer" | "single-choice" | "open-answer" => {
            Ok(Question::open_answer(entry.question, entry.answer))
        }
        other => Err(format!("unknown question type '{}'", other)),
    }
}
