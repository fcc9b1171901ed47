//! # Progress Events
//!
//! What a run reports at every stage boundary.

use super::pipeline::PipelineStage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One progress notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub stage: PipelineStage,
    pub message: String,
    /// In `[0, 1]`, or `-1.0` once the run has failed.
    pub progress: f32,
    pub timestamp: DateTime<Utc>,
}

impl ProgressEvent {
    pub fn new(stage: PipelineStage, message: impl Into<String>, progress: f32) -> Self {
        Self {
            stage,
            message: message.into(),
            progress,
            timestamp: Utc::now(),
        }
    }

    pub fn started(stage: PipelineStage) -> Self {
        Self::new(stage, stage.started_message(), stage.progress_start())
    }

    pub fn completed(stage: PipelineStage) -> Self {
        Self::new(stage, stage.completed_message(), stage.progress_end())
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::new(PipelineStage::Error, message, PipelineStage::Error.progress_start())
    }

    pub fn is_error(&self) -> bool {
        self.stage == PipelineStage::Error
    }
}
