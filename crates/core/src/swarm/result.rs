//! # Pipeline Result
//!
//! Everything one run produced, including partial output from a failed run.

use super::events::ProgressEvent;
use super::pipeline::PipelineStage;
use crate::figma::DesignDocument;
use crate::skills::artifact_registry::{
    Architecture, Artifact, DesignAnalysis, GeneratedCode, GeneratedFile, ReviewResult,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    /// Absent when the run started from screenshots.
    pub design_document: Option<DesignDocument>,
    /// Stage outputs as the model returned them; serialized verbatim.
    pub design_analysis: Option<Artifact<DesignAnalysis>>,
    pub architecture: Option<Artifact<Architecture>>,
    pub generated_code: Option<Artifact<GeneratedCode>>,
    pub review: Option<Artifact<ReviewResult>>,
    /// `"[stage] message"` for a failed run.
    pub error: Option<String>,
    /// Furthest stage reached; the failing stage when `error` is set.
    pub current_stage: PipelineStage,
    pub events: Vec<ProgressEvent>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Default for PipelineResult {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineResult {
    pub fn new() -> Self {
        Self {
            design_document: None,
            design_analysis: None,
            architecture: None,
            generated_code: None,
            review: None,
            error: None,
            current_stage: PipelineStage::Fetch,
            events: Vec::new(),
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// No error and a review object with at least one key.
    pub fn success(&self) -> bool {
        self.error.is_none() && self.review.as_ref().is_some_and(|r| !r.is_empty())
    }

    /// Generated source files, empty until the coder stage has run.
    pub fn files(&self) -> &[GeneratedFile] {
        self.generated_code
            .as_ref()
            .map(|c| c.files.as_slice())
            .unwrap_or_default()
    }

    /// Working stages that finished before the run ended.
    pub fn completed_stages(&self) -> Vec<PipelineStage> {
        PipelineStage::ORDER
            .into_iter()
            .take_while(|stage| *stage != self.current_stage)
            .collect()
    }

    pub fn last_event(&self) -> Option<&ProgressEvent> {
        self.events.last()
    }

    pub fn duration(&self) -> Option<chrono::Duration> {
        self.finished_at.map(|end| end - self.started_at)
    }
}
