//! # JSON Extraction
//!
//! Pulls a single JSON object out of free-form model output. Models wrap
//! answers in prose and Markdown fences, so extraction strips fence markers
//! and slices from the first `{` to the last `}` before parsing.

use super::LlmError;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

fn fence_pattern() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| Regex::new(r"```(?:json)?\s*").expect("static fence pattern"))
}

/// Extract and parse the JSON object embedded in `text`.
///
/// Fails with [`LlmError::MalformedResponse`] when no `{ ... }` span exists
/// or the span is not valid JSON.
pub fn extract_json(text: &str) -> Result<Value, LlmError> {
    let cleaned = fence_pattern().replace_all(text, "");
    let cleaned = cleaned.trim();

    let (start, end) = match (cleaned.find('{'), cleaned.rfind('}')) {
        (Some(start), Some(end)) if start < end => (start, end),
        _ => {
            return Err(LlmError::MalformedResponse(format!(
                "no JSON object found in response ({} chars): {}",
                cleaned.len(),
                preview(cleaned)
            )))
        }
    };

    serde_json::from_str(&cleaned[start..=end]).map_err(|e| {
        LlmError::MalformedResponse(format!(
            "invalid JSON at line {} column {}: {}",
            e.line(),
            e.column(),
            e
        ))
    })
}

fn preview(text: &str) -> String {
    let head: String = text.chars().take(80).collect();
    if head.len() < text.len() {
        format!("{}...", head)
    } else {
        head
    }
}
