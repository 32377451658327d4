//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the stateless REST endpoints and the master
//! definition for the OpenAPI document.

use crate::web::state::AppState;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use quiz_core::{
    domain::{GenerateQuizOptions, Question, QuestionKind},
    ports::PortError,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};
use utoipa::{OpenApi, ToSchema};

const PDF_CONTENT_TYPE: &str = "application/pdf";

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        create_quiz_handler,
        evaluate_answer_handler,
    ),
    components(
        schemas(CreateQuizResponse, QuizQuestion, EvaluateAnswerRequest, EvaluateAnswerResponse)
    ),
    tags(
        (name = "PDF Quiz API", description = "API endpoints for generating and grading quizzes from PDF documents.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// A generated question, including its answer for client-side grading.
#[derive(Serialize, ToSchema, Debug, PartialEq, Eq)]
pub struct QuizQuestion {
    /// `multiple-choice` or `short-answer`.
    #[serde(rename = "type")]
    pub kind: String,
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    pub answer: String,
}

impl From<Question> for QuizQuestion {
    fn from(question: Question) -> Self {
        let (kind, options) = match question.kind {
            QuestionKind::MultipleChoice { options } => ("multiple-choice", Some(options)),
            QuestionKind::OpenAnswer => ("short-answer", None),
        };
        Self {
            kind: kind.to_string(),
            question: question.text,
            options,
            answer: question.correct_answer,
        }
    }
}

/// The response payload sent after successfully generating a quiz.
#[derive(Serialize, ToSchema)]
pub struct CreateQuizResponse {
    questions: Vec<QuizQuestion>,
}

#[derive(Deserialize, ToSchema)]
pub struct EvaluateAnswerRequest {
    pub question: String,
    pub expected_answer: String,
    pub user_answer: String,
}

#[derive(Serialize, ToSchema)]
pub struct EvaluateAnswerResponse {
    correct: bool,
}

/// Maps a port failure onto the HTTP status reported to the client.
pub fn port_error_status(error: &PortError) -> StatusCode {
    match error {
        PortError::InvalidDocument(_) => StatusCode::BAD_REQUEST,
        PortError::TooManyPages { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        PortError::MalformedResponse(_) => StatusCode::BAD_GATEWAY,
        PortError::TimedOut(_) => StatusCode::GATEWAY_TIMEOUT,
        PortError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Generate a quiz from an uploaded PDF.
///
/// Accepts a multipart/form-data request with a `pdf` file part and an optional
/// `include_open_answer` text part (`true` to mix in short-answer questions).
#[utoipa::path(
    post,
    path = "/quizzes",
    request_body(content_type = "multipart/form-data", description = "The PDF to generate a quiz from."),
    responses(
        (status = 201, description = "Quiz generated successfully", body = CreateQuizResponse),
        (status = 400, description = "Bad request (e.g., missing or non-PDF file)"),
        (status = 422, description = "The PDF has too many pages"),
        (status = 502, description = "The quiz generator failed or replied with malformed JSON"),
        (status = 504, description = "The quiz generator timed out")
    )
)]
pub async fn create_quiz_handler(
    State(app_state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let mut document = None;
    let mut options = GenerateQuizOptions::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            format!("Failed to read multipart data: {}", e),
        )
    })? {
        match field.name() {
            Some("pdf") => {
                if field.content_type() != Some(PDF_CONTENT_TYPE) {
                    return Err((StatusCode::BAD_REQUEST, "Invalid file type".to_string()));
                }
                let data = field.bytes().await.map_err(|e| {
                    (
                        StatusCode::BAD_REQUEST,
                        format!("Failed to read file bytes: {}", e),
                    )
                })?;
                document = Some(data);
            }
            Some("include_open_answer") => {
                let value = field.text().await.map_err(|e| {
                    (
                        StatusCode::BAD_REQUEST,
                        format!("Failed to read include_open_answer: {}", e),
                    )
                })?;
                options.include_open_answer = value.trim().eq_ignore_ascii_case("true");
            }
            _ => {}
        }
    }

    let document = document.ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            "Multipart form must include a pdf file".to_string(),
        )
    })?;

    match app_state.generate_quiz_from_document(&document, options).await {
        Ok(questions) => {
            info!("Generated a {} question quiz over REST.", questions.len());
            let response = CreateQuizResponse {
                questions: questions.into_iter().map(QuizQuestion::from).collect(),
            };
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(e) => {
            error!("Failed to generate quiz: {:?}", e);
            Err((port_error_status(&e), e.to_string()))
        }
    }
}

/// Grade a short answer.
///
/// An evaluator failure is reported as an incorrect answer rather than an error.
#[utoipa::path(
    post,
    path = "/evaluations",
    request_body = EvaluateAnswerRequest,
    responses(
        (status = 200, description = "Answer graded", body = EvaluateAnswerResponse),
        (status = 400, description = "The user answer is empty")
    )
)]
pub async fn evaluate_answer_handler(
    State(app_state): State<Arc<AppState>>,
    Json(req): Json<EvaluateAnswerRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if req.user_answer.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Answer must not be empty".to_string()));
    }

    let correct = match app_state
        .evaluate_answer(&req.question, &req.expected_answer, &req.user_answer)
        .await
    {
        Ok(correct) => correct,
        Err(e) => {
            warn!("Grading failed, reporting the answer as incorrect: {}", e);
            false
        }
    };
    Ok(Json(EvaluateAnswerResponse { correct }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::test_support::{app_state, app_state_with, BrokenEvaluator};
    use axum::{
        body::Body,
        extract::{FromRequest, Request},
        http::header::CONTENT_TYPE,
        response::Response,
    };

    const BOUNDARY: &str = "quiz-boundary";

    async fn multipart(body: String) -> Multipart {
        let request = Request::builder()
            .method("POST")
            .uri("/quizzes")
            .header(CONTENT_TYPE, format!("multipart/form-data; boundary={}", BOUNDARY))
            .body(Body::from(body))
            .unwrap();
        Multipart::from_request(request, &()).await.unwrap()
    }

    fn part(name: &str, content_type: Option<&str>, value: &str) -> String {
        let mut part = format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n",
            BOUNDARY, name
        );
        if let Some(content_type) = content_type {
            part.push_str(&format!("Content-Type: {}\r\n", content_type));
        }
        part.push_str(&format!("\r\n{}\r\n", value));
        part
    }

    fn closing() -> String {
        format!("--{}--\r\n", BOUNDARY)
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn question_keeps_the_generator_wire_shape() {
        let open = QuizQuestion::from(Question::open_answer("Symbol for water?", "H2O"));
        assert_eq!(
            serde_json::to_value(&open).unwrap(),
            serde_json::json!({"type": "short-answer", "question": "Symbol for water?", "answer": "H2O"})
        );
        let mc = QuizQuestion::from(Question::multiple_choice("Q", vec!["a".to_string()], "a"));
        assert_eq!(mc.kind, "multiple-choice");
        assert_eq!(mc.options, Some(vec!["a".to_string()]));
    }

    #[test]
    fn port_errors_map_to_statuses() {
        assert_eq!(
            port_error_status(&PortError::TooManyPages { pages: 10, limit: 9 }),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            port_error_status(&PortError::InvalidDocument("x".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            port_error_status(&PortError::MalformedResponse("x".to_string())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            port_error_status(&PortError::TimedOut("x".to_string())),
            StatusCode::GATEWAY_TIMEOUT
        );
    }

    #[tokio::test]
    async fn evaluation_uses_configured_evaluator() {
        let request = EvaluateAnswerRequest {
            question: "Capital of France?".to_string(),
            expected_answer: "paris".to_string(),
            user_answer: "  Paris ".to_string(),
        };
        let response = evaluate_answer_handler(State(app_state()), Json(request))
            .await
            .unwrap()
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, serde_json::json!({"correct": true}));
    }

    #[tokio::test]
    async fn evaluation_failure_is_reported_as_incorrect() {
        let request = EvaluateAnswerRequest {
            question: "Capital of France?".to_string(),
            expected_answer: "Paris".to_string(),
            user_answer: "Paris".to_string(),
        };
        let state = app_state_with(Arc::new(BrokenEvaluator));
        let response = evaluate_answer_handler(State(state), Json(request))
            .await
            .unwrap()
            .into_response();
        assert_eq!(body_json(response).await, serde_json::json!({"correct": false}));
    }

    #[tokio::test]
    async fn blank_answer_is_a_bad_request() {
        let request = EvaluateAnswerRequest {
            question: "Q".to_string(),
            expected_answer: "A".to_string(),
            user_answer: "   ".to_string(),
        };
        let result = evaluate_answer_handler(State(app_state()), Json(request)).await;
        assert!(matches!(result, Err((StatusCode::BAD_REQUEST, _))));
    }

    #[tokio::test]
    async fn pdf_upload_returns_the_generated_quiz() {
        let body = [
            part("pdf", Some("application/pdf"), "%PDF-1.7"),
            part("include_open_answer", None, "true"),
            closing(),
        ]
        .concat();

        let response = create_quiz_handler(State(app_state()), multipart(body).await)
            .await
            .unwrap()
            .into_response();

        assert_eq!(response.status(), StatusCode::CREATED);
        let questions = body_json(response).await["questions"].as_array().unwrap().clone();
        assert_eq!(questions.len(), 5);
        assert!(questions.iter().any(|q| q["type"] == "short-answer"));
    }

    #[tokio::test]
    async fn non_pdf_upload_is_a_bad_request() {
        let body = [part("pdf", Some("text/plain"), "hello"), closing()].concat();
        let result = create_quiz_handler(State(app_state()), multipart(body).await).await;
        assert!(matches!(result, Err((StatusCode::BAD_REQUEST, ref message)) if message == "Invalid file type"));
    }

    #[tokio::test]
    async fn unreadable_open_answer_flag_is_a_bad_request() {
        // The stream ends inside the part, so its body cannot be read.
        let body = format!(
            "--{}\r\nContent-Disposition: form-data; name=\"include_open_answer\"\r\n\r\ntrue",
            BOUNDARY
        );
        let result = create_quiz_handler(State(app_state()), multipart(body).await).await;
        assert!(matches!(
            result,
            Err((StatusCode::BAD_REQUEST, ref message)) if message.starts_with("Failed to read include_open_answer")
        ));
    }
}
