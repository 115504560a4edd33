//! Error types for the chatrelay domain.
//!
//! Uses `thiserror` for ergonomic error definitions. Each bounded context
//! has its own error enum, folded into the top-level [`Error`] so the
//! request handler can choose a status code per failure kind instead of
//! collapsing everything into one generic catch.

use thiserror::Error;

/// The top-level error type for all chatrelay operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The inbound request is malformed — surfaced as 4xx, no side effects.
    #[error("{0}")]
    Validation(String),

    // --- History store errors ---
    #[error("History error: {0}")]
    History(#[from] HistoryError),

    // --- LLM endpoint errors ---
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),
}

#[derive(Debug, Clone, Error)]
pub enum LlmError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by endpoint, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn llm_error_displays_correctly() {
        let err = Error::Llm(LlmError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn history_error_displays_correctly() {
        let err = Error::History(HistoryError::Storage("disk full".into()));
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn validation_error_is_bare_message() {
        let err = Error::Validation("Missing 'user_prompt' in request body.".into());
        assert_eq!(err.to_string(), "Missing 'user_prompt' in request body.");
    }
}
