//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{LopdfTextAdapter, MockQuizAdapter, OpenAiGradingAdapter, OpenAiQuizAdapter},
    config::{Config, EvaluatorBackend, QuizBackend},
    error::ApiError,
    web::{create_quiz_handler, evaluate_answer_handler, rest::ApiDoc, state::AppState, ws_handler},
};
use async_openai::{config::OpenAIConfig, Client};
use axum::{
    extract::DefaultBodyLimit,
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use quiz_core::{
    grading::LocalAnswerEvaluator,
    ports::{AnswerEvaluationService, QuizGenerationService},
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Initialize Service Adapters ---
    // The client is only built when a backend actually calls OpenAI.
    let openai_client = || -> Result<Client<OpenAIConfig>, ApiError> {
        let api_key = config
            .openai_api_key
            .as_ref()
            .ok_or_else(|| ApiError::Internal("OPENAI_API_KEY is required".to_string()))?;
        Ok(Client::with_config(OpenAIConfig::new().with_api_key(api_key)))
    };

    let quiz_generator: Arc<dyn QuizGenerationService> = match config.quiz_backend {
        QuizBackend::OpenAi => Arc::new(OpenAiQuizAdapter::new(
            openai_client()?,
            config.quiz_model.clone(),
            config.question_count,
        )),
        QuizBackend::Mock => {
            info!("Using the offline mock quiz generator.");
            Arc::new(MockQuizAdapter)
        }
    };
    let answer_evaluator: Arc<dyn AnswerEvaluationService> = match config.evaluator_backend {
        EvaluatorBackend::OpenAi => Arc::new(OpenAiGradingAdapter::new(
            openai_client()?,
            config.evaluation_model.clone(),
        )),
        EvaluatorBackend::Local => {
            info!("Grading open answers locally.");
            Arc::new(LocalAnswerEvaluator)
        }
    };
    let text_source = Arc::new(LopdfTextAdapter::new(config.max_pdf_pages));

    // --- 3. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        config: config.clone(),
        text_source,
        quiz_generator,
        answer_evaluator,
    });

    let origin = config.cors_origin.parse::<HeaderValue>().map_err(|e| {
        ApiError::Internal(format!("Invalid CORS origin '{}': {}", config.cors_origin, e))
    })?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]);

    // --- 4. Create the Web Router ---
    let api_router = Router::new()
        .route("/quizzes", post(create_quiz_handler))
        .route("/evaluations", post(evaluate_answer_handler))
        .route("/ws", get(ws_handler))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
