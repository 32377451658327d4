//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Which `QuizGenerationService` to wire up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuizBackend {
    OpenAi,
    /// The fixed offline quiz.
    Mock,
}

/// Which `AnswerEvaluationService` grades open answers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EvaluatorBackend {
    OpenAi,
    /// Case-insensitive trimmed comparison, no network.
    Local,
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub cors_origin: String,
    pub openai_api_key: Option<String>,
    pub quiz_backend: QuizBackend,
    pub evaluator_backend: EvaluatorBackend,
    pub quiz_model: String,
    pub evaluation_model: String,
    pub question_count: usize,
    /// Documents with more pages are rejected; the accepted pages are all read.
    pub max_pdf_pages: usize,
    pub max_upload_bytes: usize,
    pub advance_delay: Duration,
    pub generation_timeout: Duration,
    pub evaluation_timeout: Duration,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        // --- Load Server Settings ---
        let bind_address = parse_var("BIND_ADDRESS", &var_or("BIND_ADDRESS", "0.0.0.0:3000"))?;

        let log_level_str = var_or("RUST_LOG", "INFO");
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let cors_origin = var_or("CORS_ORIGIN", "http://localhost:3000");

        // --- Select Collaborators ---
        let quiz_backend = match var_or("QUIZ_BACKEND", "openai").to_lowercase().as_str() {
            "openai" => QuizBackend::OpenAi,
            "mock" => QuizBackend::Mock,
            other => {
                return Err(ConfigError::InvalidValue(
                    "QUIZ_BACKEND".to_string(),
                    format!("'{}' is not one of openai, mock", other),
                ))
            }
        };
        let evaluator_backend = match var_or("ANSWER_EVALUATOR", "openai").to_lowercase().as_str() {
            "openai" => EvaluatorBackend::OpenAi,
            "local" => EvaluatorBackend::Local,
            other => {
                return Err(ConfigError::InvalidValue(
                    "ANSWER_EVALUATOR".to_string(),
                    format!("'{}' is not one of openai, local", other),
                ))
            }
        };

        // --- Load API Keys ---
        let openai_api_key = lookup("OPENAI_API_KEY").filter(|key| !key.trim().is_empty());
        let needs_openai =
            quiz_backend == QuizBackend::OpenAi || evaluator_backend == EvaluatorBackend::OpenAi;
        if needs_openai && openai_api_key.is_none() {
            return Err(ConfigError::MissingVar("OPENAI_API_KEY".to_string()));
        }

        // --- Load Adapter-specific Settings ---
        let quiz_model = var_or("QUIZ_MODEL", "gpt-4o-mini");
        let evaluation_model = var_or("EVALUATION_MODEL", "gpt-4o-mini");
        let question_count: usize =
            parse_var("QUIZ_QUESTION_COUNT", &var_or("QUIZ_QUESTION_COUNT", "5"))?;
        if question_count == 0 {
            return Err(ConfigError::InvalidValue(
                "QUIZ_QUESTION_COUNT".to_string(),
                "must be at least 1".to_string(),
            ));
        }
        let max_pdf_pages: usize = parse_var("MAX_PDF_PAGES", &var_or("MAX_PDF_PAGES", "9"))?;
        let max_upload_bytes: usize =
            parse_var("MAX_UPLOAD_BYTES", &var_or("MAX_UPLOAD_BYTES", "10485760"))?;

        // --- Load Timing ---
        let advance_delay =
            Duration::from_millis(parse_var("ADVANCE_DELAY_MS", &var_or("ADVANCE_DELAY_MS", "1500"))?);
        let generation_timeout = Duration::from_secs(parse_var(
            "GENERATION_TIMEOUT_SECS",
            &var_or("GENERATION_TIMEOUT_SECS", "60"),
        )?);
        let evaluation_timeout = Duration::from_secs(parse_var(
            "EVALUATION_TIMEOUT_SECS",
            &var_or("EVALUATION_TIMEOUT_SECS", "15"),
        )?);

        Ok(Self {
            bind_address,
            log_level,
            cors_origin,
            openai_api_key,
            quiz_backend,
            evaluator_backend,
            quiz_model,
            evaluation_model,
            question_count,
            max_pdf_pages,
            max_upload_bytes,
            advance_delay,
            generation_timeout,
            evaluation_timeout,
        })
    }
}

fn parse_var<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_with_api_key() {
        let config = load(&[("OPENAI_API_KEY", "sk-test")]).unwrap();
        assert_eq!(config.bind_address, "0.0.0.0:3000".parse().unwrap());
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.quiz_backend, QuizBackend::OpenAi);
        assert_eq!(config.evaluator_backend, EvaluatorBackend::OpenAi);
        assert_eq!(config.question_count, 5);
        assert_eq!(config.max_pdf_pages, 9);
        assert_eq!(config.advance_delay, Duration::from_millis(1500));
        assert_eq!(config.evaluation_timeout, Duration::from_secs(15));
    }

    #[test]
    fn api_key_required_for_openai_backends() {
        assert!(matches!(
            load(&[]),
            Err(ConfigError::MissingVar(ref var)) if var == "OPENAI_API_KEY"
        ));
        assert!(matches!(
            load(&[("QUIZ_BACKEND", "mock"), ("OPENAI_API_KEY", "  ")]),
            Err(ConfigError::MissingVar(_))
        ));
    }

    #[test]
    fn offline_backends_need_no_key() {
        let config = load(&[("QUIZ_BACKEND", "mock"), ("ANSWER_EVALUATOR", "LOCAL")]).unwrap();
        assert_eq!(config.quiz_backend, QuizBackend::Mock);
        assert_eq!(config.evaluator_backend, EvaluatorBackend::Local);
        assert!(config.openai_api_key.is_none());
    }

    #[test]
    fn rejects_invalid_values() {
        let offline = [("QUIZ_BACKEND", "mock"), ("ANSWER_EVALUATOR", "local")];
        for (key, value) in [
            ("BIND_ADDRESS", "not-an-address"),
            ("RUST_LOG", "loud"),
            ("MAX_PDF_PAGES", "-1"),
            ("ADVANCE_DELAY_MS", "soon"),
            ("QUIZ_QUESTION_COUNT", "0"),
            ("QUIZ_BACKEND", "anthropic"),
        ] {
            let mut vars = offline.to_vec();
            vars.retain(|(k, _)| *k != key);
            vars.push((key, value));
            assert!(
                matches!(load(&vars), Err(ConfigError::InvalidValue(ref k, _)) if k == key),
                "{} = {} should be rejected",
                key,
                value
            );
        }
    }
}
