//! # Figcode Core
//!
//! Turns a Figma design (or screenshots of one) into generated frontend code
//! through four model-backed stages.
//!
//! ## Architecture
//!
//! - `figma/` - Locator parsing, REST client, design-token extraction
//! - `llm/` - Provider backends and the retrying model client
//! - `models` - Provider selection and per-run model configuration
//! - `skills/` - Designer, Architect, Coder and Reviewer stages
//! - `swarm/` - Pipeline orchestration and progress reporting
//!
//! ## Usage
//!
//! ```rust,ignore
//! use figcode_core::figma::{FigmaClient, FigmaConfig};
//! use figcode_core::swarm::{Coordinator, CoordinatorConfig};
//!
//! let figma = FigmaClient::new(FigmaConfig::new(token))?;
//! let coordinator = Coordinator::new(CoordinatorConfig::default(), Arc::new(figma))?;
//! let result = coordinator.run_url("https://www.figma.com/design/ABC123/Shop").await;
//! ```

pub mod figma;
pub mod llm;
pub mod models;
pub mod retry;
pub mod skills;
pub mod swarm;
