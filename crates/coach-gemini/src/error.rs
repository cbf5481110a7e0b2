//! Error types for the Gemini analysis client.

use thiserror::Error;

/// Result type for Gemini operations.
pub type GeminiResult<T> = Result<T, GeminiError>;

/// Errors that can occur while obtaining an analysis from Gemini.
#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("Gemini request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Gemini API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Video processing failed: {0}")]
    ProcessingFailed(String),

    #[error("Timed out waiting for video processing after {0} seconds")]
    PollTimeout(u64),

    #[error("No content in Gemini response")]
    EmptyResponse,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GeminiError {
    /// Create an API error from a non-success response.
    pub fn api(status: u16, body: impl Into<String>) -> Self {
        Self::Api {
            status,
            body: body.into(),
        }
    }

    /// Create a remote processing failure error.
    pub fn processing_failed(message: impl Into<String>) -> Self {
        Self::ProcessingFailed(message.into())
    }
}
