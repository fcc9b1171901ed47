//! # Reviewer Skill
//!
//! Scores generated code against a reduced view of the design analysis:
//! palette, typography and component names.

use super::artifact_registry::{Artifact, DesignAnalysis, GeneratedCode, ReviewResult};
use super::llm_helpers::pretty;
use super::{prompts, StageSkill};
use serde_json::{json, Map, Value};

#[derive(Debug, Clone, Copy)]
pub struct ReviewerInput<'a> {
    pub generated_code: &'a Artifact<GeneratedCode>,
    pub design_analysis: &'a Artifact<DesignAnalysis>,
}

fn entries<'a>(value: Option<&'a Value>) -> &'a [Value] {
    value.and_then(Value::as_array).map(Vec::as_slice).unwrap_or_default()
}

fn text_of(entry: &Value, key: &str) -> Value {
    entry.get(key).cloned().unwrap_or_else(|| Value::String(String::new()))
}

/// Path and content of every generated file, as the coder wrote them.
fn file_views(code: &Artifact<GeneratedCode>) -> Vec<Value> {
    entries(code.field("files"))
        .iter()
        .map(|f| json!({"path": text_of(f, "path"), "content": text_of(f, "content")}))
        .collect()
}

fn design_context(analysis: &Artifact<DesignAnalysis>) -> Value {
    let components: Vec<Value> = entries(analysis.field("components"))
        .iter()
        .map(|c| text_of(c, "name"))
        .collect();
    json!({
        "color_palette": analysis.field("color_palette").cloned().unwrap_or(Value::Object(Map::new())),
        "typography": analysis.field("typography").cloned().unwrap_or(Value::Array(Vec::new())),
        "components": components,
    })
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReviewerSkill;

impl StageSkill for ReviewerSkill {
    type Input<'a> = ReviewerInput<'a>;
    type Output = ReviewResult;

    const ID: &'static str = "reviewer";
    const NAME: &'static str = "Reviewer";
    const MAX_TOKENS: u32 = 4096;

    fn system_prompt(&self, _input: &ReviewerInput<'_>) -> &'static str {
        prompts::REVIEWER
    }

    fn build_prompt(&self, input: &ReviewerInput<'_>) -> String {
        format!(
            "Review the following generated code.\n\n\
             ## Generated code\n{}\n\n\
             ## Original design analysis\n{}\n\n\
             Assess code quality, design fidelity, accessibility and responsiveness.\n",
            pretty(&file_views(input.generated_code)),
            pretty(&design_context(input.design_analysis)),
        )
    }
}
