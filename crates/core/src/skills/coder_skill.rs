//! # Coder Skill
//!
//! Generates source files from the design document plus the design tokens.
//! The designer's component inventory is not re-sent; the architecture
//! already carries it.

use super::artifact_registry::{Architecture, Artifact, DesignAnalysis, GeneratedCode};
use super::llm_helpers::pretty;
use super::{prompts, StageSkill};
use serde_json::{json, Map, Value};

#[derive(Debug, Clone, Copy)]
pub struct CoderInput<'a> {
    pub architecture: &'a Artifact<Architecture>,
    pub design_analysis: &'a Artifact<DesignAnalysis>,
}

/// Token subset of the analysis embedded in the coder prompt, taken from the
/// designer's raw output.
fn design_tokens(analysis: &Artifact<DesignAnalysis>) -> Value {
    let field = |key: &str, fallback: Value| analysis.field(key).cloned().unwrap_or(fallback);
    json!({
        "color_palette": field("color_palette", Value::Object(Map::new())),
        "typography": field("typography", Value::Array(Vec::new())),
        "spacing": field("spacing", Value::Object(Map::new())),
        "layout": field("layout", Value::Object(Map::new())),
    })
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CoderSkill;

impl StageSkill for CoderSkill {
    type Input<'a> = CoderInput<'a>;
    type Output = GeneratedCode;

    const ID: &'static str = "coder";
    const NAME: &'static str = "Coder";
    const MAX_TOKENS: u32 = 16384;

    fn system_prompt(&self, _input: &CoderInput<'_>) -> &'static str {
        prompts::CODER
    }

    fn build_prompt(&self, input: &CoderInput<'_>) -> String {
        format!(
            "Generate production-quality React/Next.js code from the component design \
             document and design tokens below.\n\n\
             ## Component design document\n{}\n\n\
             ## Design tokens\n{}\n\n\
             Generate TSX for every component in the design document. \
             Each component must work as written.\n",
            pretty(input.architecture),
            pretty(&design_tokens(input.design_analysis)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skills::artifact_registry::{ColorPalette, DesignComponent};

    #[test]
    fn test_prompt_sends_tokens_but_not_inventory() {
        let architecture = Artifact::from(Architecture {
            project_name: "shop".to_string(),
            ..Default::default()
        });
        let analysis = Artifact::from(DesignAnalysis {
            color_palette: ColorPalette {
                primary: Some("#112233".to_string()),
                ..Default::default()
            },
            components: vec![DesignComponent {
                name: "DesignerOnlyWidget".to_string(),
                ..Default::default()
            }],
            design_summary: "summary text".to_string(),
            ..Default::default()
        });

        let prompt = CoderSkill.build_prompt(&CoderInput {
            architecture: &architecture,
            design_analysis: &analysis,
        });

        assert!(prompt.contains("\"project_name\": \"shop\""));
        assert!(prompt.contains("\"primary\": \"#112233\""));
        assert!(prompt.contains("\"spacing\""));
        assert!(prompt.contains("\"layout\""));
        assert!(!prompt.contains("DesignerOnlyWidget"));
        assert!(!prompt.contains("summary text"));
    }

    #[test]
    fn test_missing_token_sections_are_sent_empty() {
        let architecture: Artifact<Architecture> =
            Artifact::from_raw(json!({"tailwind_config": {"colors": {"brand": {"DEFAULT": "#ff0066"}}}}));
        let analysis: Artifact<DesignAnalysis> =
            Artifact::from_raw(json!({"color_palette": {"primary": "#000000"}}));

        let prompt = CoderSkill.build_prompt(&CoderInput {
            architecture: &architecture,
            design_analysis: &analysis,
        });

        assert!(prompt.contains("\"DEFAULT\": \"#ff0066\""));
        assert!(prompt.contains("\"typography\": []"));
        assert!(prompt.contains("\"spacing\": {}"));
        assert!(!prompt.contains("\"project_name\""));
    }
}
