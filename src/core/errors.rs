//! Custom error types for translation runs

use thiserror::Error;

/// Translation-related errors
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Invalid or incomplete configuration (credentials, limits)
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
    },

    /// Input file has no header row
    #[error("TSV header row is missing: {path}")]
    MissingHeader {
        path: String,
    },

    /// Input header lacks a required column
    #[error("Missing column: {message}")]
    MissingColumn {
        message: String,
    },

    /// API request failed with a non-retryable status
    #[error("API error: {status} - {message}")]
    ApiError {
        status: u16,
        message: String,
    },

    /// Still rate limited after every attempt
    #[error("Rate limit exceeded after {attempts} attempts")]
    RateLimitExceeded {
        attempts: u32,
    },

    /// Request never got a response (connect failure, timeout)
    #[error("Network error: {message}")]
    NetworkError {
        message: String,
    },

    /// Response body is not the expected JSON array
    #[error("Invalid response: {message}")]
    InvalidResponseError {
        message: String,
    },

    /// Service returned a different number of items than requested
    #[error("Unexpected number of translations returned: expected {expected}, got {actual}")]
    TranslationCountMismatch {
        expected: usize,
        actual: usize,
    },

    /// Input or output file could not be read or written
    #[error("File error: {path} - {message}")]
    FileError {
        path: String,
        message: String,
    },

    /// Underlying I/O failure
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// HTTP client could not be built
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Config file is not valid JSON
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Malformed TSV record
    #[error("TSV error: {0}")]
    CsvError(#[from] csv::Error),
}

impl TranslationError {
    /// Shorthand for a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        TranslationError::ConfigError {
            message: message.into(),
        }
    }
}

/// Result type for translation operations
pub type Result<T> = std::result::Result<T, TranslationError>;
