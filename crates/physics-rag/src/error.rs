//! Error types for the RAG system

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::path::Path;
use thiserror::Error;

/// Result type alias for RAG operations
pub type Result<T> = std::result::Result<T, Error>;

/// RAG system errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error, detected before any processing starts
    #[error("Configuration error: {0}")]
    Config(String),

    /// A single file could not be converted to text
    #[error("Failed to extract '{path}': {message}")]
    Extraction { path: String, message: String },

    /// Embedding service unreachable or rejected the request
    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    /// Vector store rejected a write or query
    #[error("Vector store error: {0}")]
    Store(String),

    /// Generation endpoint failed
    #[error("Generation failed: {0}")]
    Generation(String),

    /// Infrastructure failure during ingestion, with the file and step it hit
    #[error("Ingestion aborted at {file} ({step}): {source}")]
    Ingestion {
        file: String,
        step: String,
        #[source]
        source: Box<Error>,
    },

    /// Deadline exceeded
    #[error("{operation} timed out after {secs}s")]
    Timeout { operation: &'static str, secs: u64 },

    /// Malformed inbound request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an extraction error for a file
    pub fn extraction(path: &Path, message: impl Into<String>) -> Self {
        Self::Extraction {
            path: path.display().to_string(),
            message: message.into(),
        }
    }

    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create a vector store error
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store(message.into())
    }

    /// Create a generation error
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Wrap an infrastructure error with the ingestion file and step it occurred in
    pub fn during_ingestion(file: impl Into<String>, step: impl Into<String>, source: Error) -> Self {
        Self::Ingestion {
            file: file.into(),
            step: step.into(),
            source: Box::new(source),
        }
    }

    /// Stable tag naming the failure class
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Config(_) => "config_error",
            Error::Extraction { .. } => "extraction_error",
            Error::Embedding(_) => "embedding_error",
            Error::Store(_) => "store_error",
            Error::Generation(_) => "generation_error",
            Error::Ingestion { source, .. } => source.kind(),
            Error::Timeout { .. } => "timeout",
            Error::InvalidRequest(_) => "invalid_request",
            Error::Io(_) => "io_error",
            Error::Internal(_) => "internal_error",
        }
    }

    /// HTTP status reported for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Error::Embedding(_) | Error::Store(_) | Error::Generation(_) => StatusCode::BAD_GATEWAY,
            Error::Ingestion { source, .. } => source.status_code(),
            Error::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(kind = self.kind(), "{}", self);
        }

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
