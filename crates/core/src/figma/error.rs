//! Errors raised while resolving and fetching design sources.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FigmaError {
    /// URL does not contain a `/file/<key>` or `/design/<key>` segment.
    #[error("invalid Figma URL: {0}")]
    InvalidLocator(String),

    #[error("rate limited by Figma API: {0}")]
    RateLimited(String),

    #[error("Figma API server error (status {status}): {message}")]
    Server { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    /// Non-transient HTTP failure (bad token, missing file, ...).
    #[error("Figma API request failed (status {status}): {message}")]
    Status { status: u16, message: String },

    #[error("failed to decode Figma response: {0}")]
    Decode(String),

    #[error("node {0} not found in Figma response")]
    NodeNotFound(String),

    #[error("failed to read design image {path}: {reason}")]
    Image { path: String, reason: String },
}

impl FigmaError {
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            FigmaError::RateLimited(_) | FigmaError::Server { .. } | FigmaError::Transport(_)
        )
    }

    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            429 => FigmaError::RateLimited(message),
            500..=599 => FigmaError::Server { status, message },
            _ => FigmaError::Status { status, message },
        }
    }
}

impl From<reqwest::Error> for FigmaError {
    fn from(error: reqwest::Error) -> Self {
        if let Some(status) = error.status() {
            FigmaError::from_status(status.as_u16(), error.to_string())
        } else if error.is_decode() {
            FigmaError::Decode(error.to_string())
        } else {
            FigmaError::Transport(error.to_string())
        }
    }
}
