//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service.

use crate::config::ConfigError;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_without_key() -> Result<crate::config::Config, ApiError> {
        Ok(crate::config::Config::from_lookup(|_| None)?)
    }

    #[test]
    fn config_failures_surface_through_api_error() {
        let err = load_without_key().unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
        assert_eq!(
            err.to_string(),
            "Configuration error: Missing the environment variable OPENAI_API_KEY"
        );
    }
}
