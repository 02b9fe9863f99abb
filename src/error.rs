//! Error types for Recap.

use crate::llm::LlmError;
use crate::pipeline::{Task, TemplateKind};
use thiserror::Error;

/// Library-level error type for Recap operations.
#[derive(Error, Debug)]
pub enum RecapError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid API key: {0}")]
    InvalidCredential(String),

    #[error("No transcript available for video {0}")]
    NoTranscript(String),

    #[error("Video source error: {0}")]
    VideoSource(String),

    #[error("Video search failed: {0}")]
    Search(String),

    /// A generation call failed inside a pipeline run.
    #[error(
        "{task} {step} step failed on chunk {} of {chunk_count}: {source}",
        .chunk_index + 1
    )]
    Generation {
        task: Task,
        step: TemplateKind,
        chunk_index: usize,
        chunk_count: usize,
        #[source]
        source: LlmError,
    },

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("External tool failed: {0}")]
    ToolFailed(String),
}

impl RecapError {
    /// Whether the underlying provider failure was a rate limit.
    pub fn is_rate_limited(&self) -> bool {
        self.llm_source().is_some_and(LlmError::is_rate_limited)
    }

    /// Whether the provider rejected the credential.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self.llm_source(), Some(LlmError::Auth(_)))
    }

    fn llm_source(&self) -> Option<&LlmError> {
        match self {
            RecapError::Generation { source, .. } => Some(source),
            RecapError::Llm(e) => Some(e),
            _ => None,
        }
    }
}

/// Result type alias for Recap operations.
pub type Result<T> = std::result::Result<T, RecapError>;
