//! # Pipeline Coordinator
//!
//! Runs fetch → designer → architect → coder → reviewer in order, threading
//! each stage's output into the next. The first failure halts the run; what
//! earlier stages produced stays on the result.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::figma::{
    load_images, parse_locator, DesignDocument, DesignImage, DesignInput, DesignSource, FigmaError,
};
use crate::llm::{LlmBackend, LlmError, ModelClient};
use crate::models::ModelConfig;
use crate::retry::RetryPolicy;
use crate::skills::designer_skill::DEFAULT_COMPONENT_LIMIT;
use crate::skills::{
    run_skill, ArchitectSkill, CoderInput, CoderSkill, DesignerInput, DesignerSkill,
    ReviewerInput, ReviewerSkill, StageSkill,
};

use super::events::ProgressEvent;
use super::pipeline::PipelineStage;
use super::result::PipelineResult;

/// Configuration for the coordinator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Model used by every stage without an override
    pub model: ModelConfig,
    /// Per-stage model overrides (stage id -> model name)
    pub per_stage_models: HashMap<String, String>,
    /// Retry policy for each model call
    pub retry: RetryPolicy,
    /// Wall-clock bound on a single model call
    pub request_timeout_secs: u64,
    /// Reject stage output missing any top-level schema key
    pub strict_schema: bool,
    /// Components sent to the designer
    pub component_limit: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            model: ModelConfig::default(),
            per_stage_models: HashMap::new(),
            retry: RetryPolicy::default(),
            request_timeout_secs: 600,
            strict_schema: false,
            component_limit: DEFAULT_COMPONENT_LIMIT,
        }
    }
}

impl CoordinatorConfig {
    /// Model config for one stage: the global one with its model name
    /// overridden when the stage has an entry in `per_stage_models`.
    pub fn model_config_for(&self, stage_id: &str) -> ModelConfig {
        let mut config = self.model.clone();
        if let Some(model) = self.per_stage_models.get(stage_id) {
            config.model = model.clone();
        }
        config
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Failure inside one stage.
#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    Design(#[from] FigmaError),
    #[error(transparent)]
    Model(#[from] LlmError),
}

/// Called synchronously for every progress event.
pub type ProgressCallback = Arc<dyn Fn(&ProgressEvent) + Send + Sync>;

#[derive(Debug, Clone)]
struct StageClients {
    default: ModelClient,
    overrides: HashMap<String, ModelClient>,
}

impl StageClients {
    fn get(&self, stage_id: &str) -> &ModelClient {
        self.overrides.get(stage_id).unwrap_or(&self.default)
    }
}

/// Output of the fetch stage.
enum FetchedDesign {
    Document(DesignDocument),
    Images(Vec<DesignImage>),
}

impl FetchedDesign {
    fn designer_input(&self) -> DesignerInput<'_> {
        match self {
            FetchedDesign::Document(doc) => DesignerInput::Document(doc),
            FetchedDesign::Images(images) => DesignerInput::Images(images),
        }
    }
}

/// The pipeline coordinator
pub struct Coordinator {
    config: CoordinatorConfig,
    source: Arc<dyn DesignSource>,
    clients: StageClients,
    progress: Option<ProgressCallback>,
    event_tx: Option<mpsc::Sender<ProgressEvent>>,
}

impl Coordinator {
    /// Build provider backends from `config`, one per distinct stage override.
    pub fn new(config: CoordinatorConfig, source: Arc<dyn DesignSource>) -> Result<Self, LlmError> {
        let timeout = config.request_timeout();
        let build = |model_config: &ModelConfig| -> Result<ModelClient, LlmError> {
            let backend = model_config.create_backend(timeout)?;
            Ok(ModelClient::new(backend).with_retry_policy(config.retry.clone()))
        };

        let default = build(&config.model)?;
        let mut overrides = HashMap::new();
        for stage_id in config.per_stage_models.keys() {
            overrides.insert(stage_id.clone(), build(&config.model_config_for(stage_id))?);
        }

        Ok(Self::assemble(config, source, StageClients { default, overrides }))
    }

    /// Use one already-built backend for every stage.
    pub fn with_backend(
        config: CoordinatorConfig,
        backend: Arc<dyn LlmBackend>,
        source: Arc<dyn DesignSource>,
    ) -> Self {
        let default = ModelClient::new(backend).with_retry_policy(config.retry.clone());
        Self::assemble(
            config,
            source,
            StageClients {
                default,
                overrides: HashMap::new(),
            },
        )
    }

    fn assemble(config: CoordinatorConfig, source: Arc<dyn DesignSource>, clients: StageClients) -> Self {
        Self {
            config,
            source,
            clients,
            progress: None,
            event_tx: None,
        }
    }

    /// Route one stage to its own backend
    pub fn with_stage_backend(mut self, stage: PipelineStage, backend: Arc<dyn LlmBackend>) -> Self {
        let client = ModelClient::new(backend).with_retry_policy(self.config.retry.clone());
        self.clients.overrides.insert(stage.label().to_string(), client);
        self
    }

    /// Set a callback invoked for every progress event
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(&ProgressEvent) + Send + Sync + 'static,
    {
        self.progress = Some(Arc::new(callback));
        self
    }

    /// Set event channel for streaming progress. Sending never blocks the run:
    /// an event that finds the channel full is dropped with a warning, and
    /// every event is still recorded on the result.
    pub fn with_event_channel(mut self, tx: mpsc::Sender<ProgressEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    fn emit(&self, result: &mut PipelineResult, event: ProgressEvent) {
        if let Some(callback) = &self.progress {
            callback(&event);
        }
        if let Some(tx) = &self.event_tx {
            match tx.try_send(event.clone()) {
                Ok(()) | Err(TrySendError::Closed(_)) => {}
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(stage = %event.stage, "Progress channel full, event dropped")
                }
            }
        }
        result.events.push(event);
    }

    fn enter(&self, result: &mut PipelineResult, stage: PipelineStage) {
        result.current_stage = stage;
        tracing::info!(stage = %stage, "Stage started");
        self.emit(result, ProgressEvent::started(stage));
    }

    fn finish(&self, result: &mut PipelineResult, stage: PipelineStage) {
        tracing::info!(stage = %stage, "Stage completed");
        self.emit(result, ProgressEvent::completed(stage));
    }

    /// Run every stage against `input`. Never fails; a failure is recorded on
    /// the returned result together with everything produced before it.
    #[tracing::instrument(skip(self, input))]
    pub async fn run(&self, input: &DesignInput) -> PipelineResult {
        let mut result = PipelineResult::new();
        tracing::info!(?input, "Pipeline started");

        match self.execute(input, &mut result).await {
            Ok(()) => {
                result.current_stage = PipelineStage::Done;
                self.emit(&mut result, ProgressEvent::started(PipelineStage::Done));
                tracing::info!("Pipeline complete");
            }
            Err(e) => {
                let stage = result.current_stage;
                tracing::error!(stage = %stage, error = %e, "Pipeline failed");
                result.error = Some(format!("[{}] {}", stage, e));
                self.emit(&mut result, ProgressEvent::failed(e.to_string()));
            }
        }

        result.finished_at = Some(chrono::Utc::now());
        result
    }

    /// Run against a Figma URL.
    pub async fn run_url(&self, url: &str) -> PipelineResult {
        self.run(&DesignInput::Url {
            url: url.to_string(),
        })
        .await
    }

    async fn execute(&self, input: &DesignInput, result: &mut PipelineResult) -> Result<(), StageError> {
        let strict = self.config.strict_schema;

        // Stage 1: design data
        self.enter(result, PipelineStage::Fetch);
        let design = self.fetch(input).await?;
        if let FetchedDesign::Document(doc) = &design {
            result.design_document = Some(doc.clone());
        }
        self.finish(result, PipelineStage::Fetch);

        // Stage 2: Designer
        self.enter(result, PipelineStage::Designer);
        let designer = DesignerSkill::new(self.config.component_limit);
        let analysis = run_skill(
            &designer,
            self.clients.get(DesignerSkill::ID),
            &design.designer_input(),
            strict,
        )
        .await?;
        result.design_analysis = Some(analysis.clone());
        self.finish(result, PipelineStage::Designer);

        // Stage 3: Architect
        self.enter(result, PipelineStage::Architect);
        let architecture = run_skill(
            &ArchitectSkill,
            self.clients.get(ArchitectSkill::ID),
            &analysis,
            strict,
        )
        .await?;
        result.architecture = Some(architecture.clone());
        self.finish(result, PipelineStage::Architect);

        // Stage 4: Coder
        self.enter(result, PipelineStage::Coder);
        let code = run_skill(
            &CoderSkill,
            self.clients.get(CoderSkill::ID),
            &CoderInput {
                architecture: &architecture,
                design_analysis: &analysis,
            },
            strict,
        )
        .await?;
        tracing::info!(files = code.files.len(), "Generated files");
        result.generated_code = Some(code.clone());
        self.finish(result, PipelineStage::Coder);

        // Stage 5: Reviewer
        self.enter(result, PipelineStage::Reviewer);
        let review = run_skill(
            &ReviewerSkill,
            self.clients.get(ReviewerSkill::ID),
            &ReviewerInput {
                generated_code: &code,
                design_analysis: &analysis,
            },
            strict,
        )
        .await?;
        if !review.approval_consistent() {
            tracing::warn!(
                score = review.score,
                approved = review.approved,
                "Reviewer approval flag disagrees with its score"
            );
        }
        result.review = Some(review);
        self.finish(result, PipelineStage::Reviewer);

        Ok(())
    }

    async fn fetch(&self, input: &DesignInput) -> Result<FetchedDesign, FigmaError> {
        match input {
            DesignInput::Url { url } => {
                let locator = parse_locator(url)?;
                let document = self.source.fetch(&locator).await?;
                Ok(FetchedDesign::Document(document))
            }
            DesignInput::Images { paths } => {
                if paths.is_empty() {
                    return Err(FigmaError::Image {
                        path: String::new(),
                        reason: "no image paths given".to_string(),
                    });
                }
                Ok(FetchedDesign::Images(load_images(paths).await?))
            }
        }
    }
}
