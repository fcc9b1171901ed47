//! Errors raised by the model client.

use thiserror::Error;

/// Failure of a single model call or of decoding its response.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Provider signalled a rate limit (HTTP 429).
    #[error("rate limited by model provider: {0}")]
    RateLimited(String),

    /// Momentary provider fault (5xx, overload, request timeout).
    #[error("model provider error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Network-level failure before a response arrived.
    #[error("transport error: {0}")]
    Transport(String),

    /// Provider refused the request; retrying cannot help.
    #[error("request rejected by model provider (status {status}): {message}")]
    Rejected { status: u16, message: String },

    /// Response text did not contain an extractable JSON object.
    #[error("malformed model response: {0}")]
    MalformedResponse(String),

    /// Structured response lacks top-level keys the output schema declares.
    #[error("model response is missing required keys: {}", .0.join(", "))]
    MissingKeys(Vec<String>),

    /// Provider answered but returned no text content.
    #[error("model returned an empty response")]
    EmptyResponse,

    #[error("missing credentials for provider {0}")]
    MissingCredentials(String),
}

impl LlmError {
    /// Whether the retry loop may try this call again.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LlmError::RateLimited(_) | LlmError::Api { .. } | LlmError::Transport(_)
        )
    }

    /// Map a non-success HTTP status and its body onto the taxonomy.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            429 => LlmError::RateLimited(message),
            408 | 409 | 500..=599 => LlmError::Api { status, message },
            _ => LlmError::Rejected { status, message },
        }
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(error: reqwest::Error) -> Self {
        if let Some(status) = error.status() {
            LlmError::from_status(status.as_u16(), error.to_string())
        } else if error.is_timeout() {
            LlmError::Transport(format!("request timeout: {}", error))
        } else if error.is_connect() {
            LlmError::Transport(format!("connection error: {}", error))
        } else if error.is_decode() {
            LlmError::MalformedResponse(format!("undecodable provider payload: {}", error))
        } else {
            LlmError::Transport(error.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(matches!(
            LlmError::from_status(429, "slow down"),
            LlmError::RateLimited(_)
        ));
        assert!(matches!(
            LlmError::from_status(529, "overloaded"),
            LlmError::Api { status: 529, .. }
        ));
        assert!(matches!(
            LlmError::from_status(400, "bad request"),
            LlmError::Rejected { status: 400, .. }
        ));
    }

    #[test]
    fn test_transient_flags() {
        assert!(LlmError::RateLimited(String::new()).is_transient());
        assert!(LlmError::Transport("reset".into()).is_transient());
        assert!(!LlmError::MalformedResponse("no braces".into()).is_transient());
        assert!(!LlmError::from_status(401, "unauthorized").is_transient());
    }

    #[test]
    fn test_missing_keys_message() {
        let err = LlmError::MissingKeys(vec!["files".into(), "dependencies".into()]);
        assert_eq!(
            err.to_string(),
            "model response is missing required keys: files, dependencies"
        );
    }
}
