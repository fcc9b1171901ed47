//! # Architect Skill
//!
//! Maps a [`DesignAnalysis`] onto a component design document.

use super::artifact_registry::{Architecture, Artifact, DesignAnalysis};
use super::llm_helpers::pretty;
use super::{prompts, StageSkill};

#[derive(Debug, Clone, Copy, Default)]
pub struct ArchitectSkill;

impl StageSkill for ArchitectSkill {
    type Input<'a> = Artifact<DesignAnalysis>;
    type Output = Architecture;

    const ID: &'static str = "architect";
    const NAME: &'static str = "Architect";
    const MAX_TOKENS: u32 = 8192;

    fn system_prompt(&self, _input: &Artifact<DesignAnalysis>) -> &'static str {
        prompts::ARCHITECT
    }

    fn build_prompt(&self, analysis: &Artifact<DesignAnalysis>) -> String {
        format!(
            "Create the React component design document for the following design analysis.\n\n\
             ## Design analysis\n{}\n\n\
             Use the color palette, typography, layout and component list above to produce \
             the best design for Next.js App Router with Tailwind CSS and shadcn/ui.\n",
            pretty(analysis),
        )
    }
}
