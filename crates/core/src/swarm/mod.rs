//! # Swarm Orchestration
//!
//! Coordinates the stage pipeline.
//!
//! ## Pipeline Flow
//!
//! ```text
//! Figma URL | screenshots → fetch → Designer → Architect → Coder → Reviewer → done
//!                             └──────────── any failure ──────────────→ error
//! ```

pub mod coordinator;
pub mod events;
pub mod pipeline;
pub mod result;

pub use coordinator::{Coordinator, CoordinatorConfig, ProgressCallback, StageError};
pub use events::ProgressEvent;
pub use pipeline::PipelineStage;
pub use result::PipelineResult;
