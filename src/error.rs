//! Error types for the RAG chat pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our custom error.
pub type Result<T> = std::result::Result<T, RagChatError>;

/// Errors that can occur in the RAG chat pipeline.
#[derive(Error, Debug)]
pub enum RagChatError {
    /// Error reading or writing files.
    #[error("I/O error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document path does not exist.
    #[error("Document not found at '{0}'")]
    DocumentNotFound(PathBuf),

    /// The document is not a PDF file.
    #[error("Document must be a PDF file: '{0}'")]
    InvalidDocumentType(PathBuf),

    /// No PDF documents found in the corpus directory.
    #[error("No PDF documents found in corpus at '{0}'")]
    EmptyCorpus(PathBuf),

    /// Error extracting text from a PDF.
    #[error("PDF extraction error for '{path}': {message}")]
    Pdf { path: PathBuf, message: String },

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The search query was empty.
    #[error("Query must not be empty")]
    EmptyQuery,

    /// Vector store error.
    #[error("Vector store error: {0}")]
    Store(String),

    /// LLM API error.
    #[error("LLM API error: {0}")]
    LlmApi(String),

    /// LLM response parsing error.
    #[error("Failed to parse LLM response: {0}")]
    LlmParse(String),

    /// HTTP request error.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// No criterion registered under the given name.
    #[error("Unknown evaluation criterion: '{0}'")]
    CriterionNotFound(String),

    /// Evaluation pipeline failure (provider call, parsing, or scoring).
    #[error("Evaluation failed: {0}")]
    Evaluation(String),
}

impl RagChatError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a PDF extraction error with path context.
    pub fn pdf(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Pdf {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for RagChatError {
    fn from(err: reqwest::Error) -> Self {
        RagChatError::Http(err.to_string())
    }
}

impl From<serde_json::Error> for RagChatError {
    fn from(err: serde_json::Error) -> Self {
        RagChatError::LlmParse(err.to_string())
    }
}

impl From<rusqlite::Error> for RagChatError {
    fn from(err: rusqlite::Error) -> Self {
        RagChatError::Store(err.to_string())
    }
}
