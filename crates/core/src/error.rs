//! Error types for the Grounded pipelines.
//!
//! This module defines a unified error enum covering every error category in
//! the workspace: configuration, I/O, document parsing, indexing, LLM calls,
//! and memory persistence.

use thiserror::Error;

/// Unified error type for the Grounded workspace.
///
/// All fallible functions return `Result<T, AppError>`. External-collaborator
/// failures are caught at the component boundary that calls them and converted
/// into a defined fallback value; nothing above the retriever or memory store
/// boundary observes a raw provider error.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Unrecognized or rejected document type
    #[error("Unsupported input: {0}")]
    Unsupported(String),

    /// Document text extraction errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// Vector index errors
    #[error("Index error: {0}")]
    Index(String),

    /// LLM provider errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Memory store errors
    #[error("Memory error: {0}")]
    Memory(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
