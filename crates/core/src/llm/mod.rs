//! # LLM Client
//!
//! Text and structured completion over pluggable provider backends.
//!
//! ```text
//! ModelClient (retry policy)
//!   └── LlmBackend (one HTTP round trip)
//!         ├── AnthropicBackend
//!         └── OpenAiBackend
//! ```

pub mod anthropic;
pub mod client;
pub mod error;
pub mod json;
pub mod openai;

pub use anthropic::AnthropicBackend;
pub use client::{CompletionRequest, ImageAttachment, LlmBackend, ModelClient};
pub use error::LlmError;
pub use json::extract_json;
pub use openai::OpenAiBackend;
