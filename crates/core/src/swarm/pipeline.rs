//! # Pipeline Stages
//!
//! The fixed, strictly ordered stages of a run.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stage of the pipeline
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Fetching design data (Figma file or local screenshots)
    #[default]
    Fetch,
    /// Designer analysing the design
    Designer,
    /// Architect laying out components
    Architect,
    /// Coder generating files
    Coder,
    /// Reviewer scoring the output
    Reviewer,
    /// Complete
    Done,
    /// Failed; absorbing
    Error,
}

impl PipelineStage {
    /// Working stages in execution order.
    pub const ORDER: [PipelineStage; 5] = [
        PipelineStage::Fetch,
        PipelineStage::Designer,
        PipelineStage::Architect,
        PipelineStage::Coder,
        PipelineStage::Reviewer,
    ];

    /// Next stage. `Done` and `Error` stay put.
    pub fn advance(self) -> Self {
        match self {
            PipelineStage::Fetch => PipelineStage::Designer,
            PipelineStage::Designer => PipelineStage::Architect,
            PipelineStage::Architect => PipelineStage::Coder,
            PipelineStage::Coder => PipelineStage::Reviewer,
            PipelineStage::Reviewer => PipelineStage::Done,
            PipelineStage::Done => PipelineStage::Done,
            PipelineStage::Error => PipelineStage::Error,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PipelineStage::Fetch => "fetch",
            PipelineStage::Designer => "designer",
            PipelineStage::Architect => "architect",
            PipelineStage::Coder => "coder",
            PipelineStage::Reviewer => "reviewer",
            PipelineStage::Done => "done",
            PipelineStage::Error => "error",
        }
    }

    /// Progress reported when the stage starts.
    pub fn progress_start(&self) -> f32 {
        match self {
            PipelineStage::Fetch => 0.0,
            PipelineStage::Designer => 0.2,
            PipelineStage::Architect => 0.4,
            PipelineStage::Coder => 0.6,
            PipelineStage::Reviewer => 0.8,
            PipelineStage::Done => 1.0,
            PipelineStage::Error => -1.0,
        }
    }

    /// Progress reported when the stage completes.
    pub fn progress_end(&self) -> f32 {
        match self {
            PipelineStage::Error => -1.0,
            stage => stage.advance().progress_start(),
        }
    }

    pub fn started_message(&self) -> &'static str {
        match self {
            PipelineStage::Fetch => "Fetching design data",
            PipelineStage::Designer => "Designer is analysing the design",
            PipelineStage::Architect => "Architect is designing components",
            PipelineStage::Coder => "Coder is generating code",
            PipelineStage::Reviewer => "Reviewer is checking quality",
            PipelineStage::Done => "All stages complete",
            PipelineStage::Error => "Pipeline failed",
        }
    }

    pub fn completed_message(&self) -> &'static str {
        match self {
            PipelineStage::Fetch => "Design data fetched",
            PipelineStage::Designer => "Design analysis complete",
            PipelineStage::Architect => "Component design complete",
            PipelineStage::Coder => "Code generation complete",
            PipelineStage::Reviewer => "Review complete",
            PipelineStage::Done => "All stages complete",
            PipelineStage::Error => "Pipeline failed",
        }
    }

    /// Check if the stage ends a run
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineStage::Done | PipelineStage::Error)
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
