//! # Stage Skills
//!
//! The four model-backed stages of the pipeline. Each skill is a stateless
//! strategy: a fixed instruction block, a prompt builder over its inputs, a
//! token budget and an output schema.
//!
//! ```text
//! DesignDocument | screenshots ──DesignerSkill──▶ DesignAnalysis
//! DesignAnalysis ──ArchitectSkill──▶ Architecture
//! Architecture + tokens ──CoderSkill──▶ GeneratedCode
//! GeneratedCode + design context ──ReviewerSkill──▶ ReviewResult
//! ```

use crate::llm::ImageAttachment;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;

pub mod llm_helpers;
pub mod prompts;

// Artifact Registry (stage output records)
pub mod artifact_registry;

pub mod architect_skill;
pub mod coder_skill;
pub mod designer_skill;
pub mod reviewer_skill;

pub use architect_skill::ArchitectSkill;
pub use coder_skill::{CoderInput, CoderSkill};
pub use designer_skill::{DesignerInput, DesignerSkill};
pub use llm_helpers::run_skill;
pub use reviewer_skill::{ReviewerInput, ReviewerSkill};

/// One pipeline stage backed by a single structured model call.
pub trait StageSkill {
    /// Borrowed view over the prior stages' outputs.
    type Input<'a>;
    type Output: DeserializeOwned + JsonSchema + Default;

    /// Stable identifier, also used for per-stage model overrides.
    const ID: &'static str;
    const NAME: &'static str;
    /// Output token budget.
    const MAX_TOKENS: u32;

    fn system_prompt(&self, input: &Self::Input<'_>) -> &'static str;

    fn build_prompt(&self, input: &Self::Input<'_>) -> String;

    fn images(&self, _input: &Self::Input<'_>) -> Vec<ImageAttachment> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::client::test_support::ScriptedBackend;
    use crate::llm::{LlmError, ModelClient};
    use crate::retry::RetryPolicy;
    use crate::skills::artifact_registry::{Artifact, DesignAnalysis, GeneratedCode, RenderTarget};
    use serde_json::json;
    use std::sync::Arc;

    fn client(responses: Vec<Result<String, LlmError>>) -> (Arc<ScriptedBackend>, ModelClient) {
        let backend = Arc::new(ScriptedBackend::new(responses));
        let client = ModelClient::new(backend.clone()).with_retry_policy(RetryPolicy::immediate(3));
        (backend, client)
    }

    #[test]
    fn test_token_budgets() {
        assert_eq!(DesignerSkill::MAX_TOKENS, 4096);
        assert_eq!(ArchitectSkill::MAX_TOKENS, 8192);
        assert_eq!(CoderSkill::MAX_TOKENS, 16384);
        assert_eq!(ReviewerSkill::MAX_TOKENS, 4096);
    }

    #[tokio::test]
    async fn test_run_skill_parses_fenced_output() {
        let (backend, client) = client(vec![Ok(
            "Here you go:\n```json\n{\"project_name\": \"shop\", \"components\": [{\"name\": \"Hero\", \"type\": \"server\"}]}\n```"
                .to_string(),
        )]);

        let arch = run_skill(&ArchitectSkill, &client, &Artifact::default(), false)
            .await
            .unwrap();

        assert_eq!(arch.project_name, "shop");
        assert_eq!(arch.components[0].render_target, RenderTarget::Server);

        let requests = backend.requests.lock().unwrap();
        assert_eq!(requests[0].max_tokens, 8192);
        assert_eq!(requests[0].system, prompts::ARCHITECT);
    }

    #[tokio::test]
    async fn test_strict_mode_rejects_missing_keys() {
        let (_, client) = client(vec![Ok("{\"project_name\": \"shop\"}".to_string())]);

        let err = run_skill(&ArchitectSkill, &client, &Artifact::default(), true)
            .await
            .unwrap_err();

        match err {
            LlmError::MissingKeys(keys) => {
                assert!(keys.contains(&"pages".to_string()));
                assert!(!keys.contains(&"project_name".to_string()));
            }
            other => panic!("expected MissingKeys, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_lenient_mode_accepts_partial_output() {
        let (_, client) = client(vec![Ok("{\"project_name\": \"shop\"}".to_string())]);
        let arch = run_skill(&ArchitectSkill, &client, &Artifact::default(), false)
            .await
            .unwrap();
        assert!(arch.pages.is_empty());
    }

    #[tokio::test]
    async fn test_off_schema_output_passes_through_unchanged() {
        let reply = json!({
            "score": "85",
            "approved": true,
            "issues": null,
            "notes": ["keep the hero copy"]
        });
        let (backend, client) = client(vec![Ok(reply.to_string())]);
        let code = Artifact::<GeneratedCode>::from_raw(json!({"files": "not a list"}));
        let analysis = Artifact::default();

        let review = run_skill(
            &ReviewerSkill,
            &client,
            &ReviewerInput {
                generated_code: &code,
                design_analysis: &analysis,
            },
            false,
        )
        .await
        .unwrap();

        assert_eq!(review.raw(), &reply);
        assert_eq!(review.score, 85.0);
        assert!(review.meets_threshold());
        assert!(review.issues.is_empty());
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn test_nested_token_maps_reach_the_coder_prompt() {
        let (backend, client) = client(vec![
            Ok(r##"{"tailwind_config": {"colors": {"primary": {"DEFAULT": "#111111", "foreground": "#fafafa"}}}}"##.to_string()),
            Ok(r#"{"files": [{"path": "app/page.tsx", "content": "export {}"}]}"#.to_string()),
        ]);
        let analysis: Artifact<DesignAnalysis> =
            Artifact::from_raw(json!({"components": [{"name": "Hero", "children": null}]}));

        let arch = run_skill(&ArchitectSkill, &client, &analysis, false)
            .await
            .unwrap();
        assert_eq!(arch.tailwind_config.colors["primary"]["foreground"], "#fafafa");

        let code = run_skill(
            &CoderSkill,
            &client,
            &CoderInput {
                architecture: &arch,
                design_analysis: &analysis,
            },
            false,
        )
        .await
        .unwrap();
        assert_eq!(code.files[0].path, "app/page.tsx");

        let requests = backend.requests.lock().unwrap();
        assert!(requests[0].user.contains("\"children\": null"));
        assert!(requests[1].user.contains("\"foreground\": \"#fafafa\""));
    }
}
