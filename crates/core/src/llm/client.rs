//! # Model Client
//!
//! Provider-agnostic front door for every stage. A [`ModelClient`] owns one
//! [`LlmBackend`] plus a [`RetryPolicy`] and offers two operations:
//! plain text completion and structured (JSON object) completion.

use super::{extract_json, LlmError};
use crate::retry::{with_retry, RetryPolicy};
use async_trait::async_trait;
use base64::Engine;
use serde_json::Value;
use std::sync::Arc;

/// An inline image sent alongside the user message.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageAttachment {
    /// MIME type, e.g. `image/png`.
    pub media_type: String,
    /// Base64-encoded image bytes.
    pub data: String,
}

impl ImageAttachment {
    pub fn from_bytes(media_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            media_type: media_type.into(),
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
        }
    }
}

/// One model call: fixed instruction block, per-call input, token budget.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub max_tokens: u32,
    pub images: Vec<ImageAttachment>,
}

impl CompletionRequest {
    pub fn new(system: impl Into<String>, user: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            max_tokens,
            images: Vec::new(),
        }
    }

    pub fn with_images(mut self, images: Vec<ImageAttachment>) -> Self {
        self.images = images;
        self
    }
}

/// A single-shot text generation endpoint.
///
/// Implementations perform exactly one network round trip and classify the
/// failure; retrying is the [`ModelClient`]'s job.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Provider name for logs.
    fn name(&self) -> &str;

    /// Model identifier passed to the provider.
    fn model(&self) -> &str;

    async fn send(&self, request: &CompletionRequest) -> Result<String, LlmError>;
}

/// Retrying wrapper around an [`LlmBackend`].
#[derive(Clone)]
pub struct ModelClient {
    backend: Arc<dyn LlmBackend>,
    retry: RetryPolicy,
}

impl std::fmt::Debug for ModelClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelClient")
            .field("backend", &self.backend.name())
            .field("model", &self.backend.model())
            .field("retry", &self.retry)
            .finish()
    }
}

impl ModelClient {
    pub fn new(backend: Arc<dyn LlmBackend>) -> Self {
        Self {
            backend,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn model(&self) -> &str {
        self.backend.model()
    }

    /// Text completion with local retries for transient failures.
    #[tracing::instrument(skip(self, request), fields(
        provider = %self.backend.name(),
        model = %self.backend.model(),
        max_tokens = request.max_tokens,
    ))]
    pub async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let label = format!("{}:{}", self.backend.name(), self.backend.model());
        let text = with_retry(&self.retry, &label, || self.backend.send(request)).await?;
        tracing::debug!(chars = text.len(), "Model call complete");
        Ok(text)
    }

    /// Completion whose text must embed one JSON object.
    ///
    /// Extraction failures surface as [`LlmError::MalformedResponse`] and are
    /// never retried.
    pub async fn complete_structured(&self, request: &CompletionRequest) -> Result<Value, LlmError> {
        let raw = self.complete(request).await?;
        let value = extract_json(&raw)?;
        if !value.is_object() {
            return Err(LlmError::MalformedResponse(
                "extracted JSON is not an object".to_string(),
            ));
        }
        Ok(value)
    }
}
