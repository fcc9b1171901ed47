//! # LLM Helpers
//!
//! The one code path every stage takes to the model: build the request,
//! complete it as structured JSON, optionally check its keys, wrap it.

use super::artifact_registry::Artifact;
use super::StageSkill;
use crate::llm::{CompletionRequest, LlmError, ModelClient};
use schemars::JsonSchema;
use serde::Serialize;
use serde_json::Value;

/// Run one stage against `client`.
///
/// Any JSON object the model returns is accepted as is. With `strict` set,
/// every top-level property of the output schema must also be present.
pub async fn run_skill<S: StageSkill>(
    skill: &S,
    client: &ModelClient,
    input: &S::Input<'_>,
    strict: bool,
) -> Result<Artifact<S::Output>, LlmError> {
    let request = CompletionRequest::new(
        skill.system_prompt(input),
        skill.build_prompt(input),
        S::MAX_TOKENS,
    )
    .with_images(skill.images(input));

    tracing::debug!(
        skill = S::ID,
        prompt_chars = request.user.len(),
        images = request.images.len(),
        "Sending stage request"
    );
    let value = client.complete_structured(&request).await?;

    if strict {
        let missing = missing_keys::<S::Output>(&value);
        if !missing.is_empty() {
            return Err(LlmError::MissingKeys(missing));
        }
    }

    Ok(Artifact::from_raw(value))
}

/// Top-level schema properties of `T` absent from `value`, in schema order.
pub fn missing_keys<T: JsonSchema>(value: &Value) -> Vec<String> {
    let schema = serde_json::to_value(schemars::schema_for!(T)).unwrap_or(Value::Null);
    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return Vec::new();
    };
    properties
        .keys()
        .filter(|key| value.get(key.as_str()).is_none())
        .cloned()
        .collect()
}

/// Indented JSON for embedding in a prompt.
pub fn pretty<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string())
}
