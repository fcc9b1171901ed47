//! # Designer Skill
//!
//! First model stage. Turns the extracted design data (or screenshots) into a
//! [`DesignAnalysis`].

use super::artifact_registry::DesignAnalysis;
use super::llm_helpers::pretty;
use super::{prompts, StageSkill};
use crate::figma::{DesignDocument, DesignImage};
use crate::llm::ImageAttachment;

/// Components sent to the model by default.
pub const DEFAULT_COMPONENT_LIMIT: usize = 30;

/// What the designer looks at.
#[derive(Debug, Clone, Copy)]
pub enum DesignerInput<'a> {
    /// Tokens extracted from a Figma file.
    Document(&'a DesignDocument),
    /// Screenshots attached to the request.
    Images(&'a [DesignImage]),
}

#[derive(Debug, Clone)]
pub struct DesignerSkill {
    /// Components beyond this many are left out of the prompt.
    component_limit: usize,
}

impl Default for DesignerSkill {
    fn default() -> Self {
        Self::new(DEFAULT_COMPONENT_LIMIT)
    }
}

impl DesignerSkill {
    pub fn new(component_limit: usize) -> Self {
        Self { component_limit }
    }

    fn document_prompt(&self, doc: &DesignDocument) -> String {
        let top: Vec<_> = doc.components.iter().take(self.component_limit).collect();
        format!(
            "Analyse the following Figma design data.\n\n\
             ## File name\n{}\n\n\
             ## Colors\n{}\n\n\
             ## Fonts\n{}\n\n\
             ## Components (first {})\n{}\n\n\
             Produce the structured design analysis from this data.\n",
            doc.name,
            pretty(&doc.colors),
            pretty(&doc.fonts),
            top.len(),
            pretty(&top),
        )
    }

    fn images_prompt(images: &[DesignImage]) -> String {
        let names = images
            .iter()
            .enumerate()
            .map(|(i, img)| format!("{}. {}", i + 1, img.path.display()))
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            "Analyse the {} attached screenshot(s), in this order:\n{}\n\n\
             Produce the structured design analysis from what you see.\n",
            images.len(),
            names,
        )
    }
}

impl StageSkill for DesignerSkill {
    type Input<'a> = DesignerInput<'a>;
    type Output = DesignAnalysis;

    const ID: &'static str = "designer";
    const NAME: &'static str = "Designer";
    const MAX_TOKENS: u32 = 4096;

    fn system_prompt(&self, input: &DesignerInput<'_>) -> &'static str {
        match input {
            DesignerInput::Document(_) => prompts::DESIGNER,
            DesignerInput::Images(_) => prompts::DESIGNER_IMAGES,
        }
    }

    fn build_prompt(&self, input: &DesignerInput<'_>) -> String {
        match input {
            DesignerInput::Document(doc) => self.document_prompt(doc),
            DesignerInput::Images(images) => Self::images_prompt(images),
        }
    }

    fn images(&self, input: &DesignerInput<'_>) -> Vec<ImageAttachment> {
        match input {
            DesignerInput::Document(_) => Vec::new(),
            DesignerInput::Images(images) => images.iter().map(|i| i.attachment.clone()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::figma::{DesignLocator, FigmaNode};
    use std::path::PathBuf;

    fn document_with_frames(count: usize) -> DesignDocument {
        let children = (0..count)
            .map(|i| FigmaNode {
                id: Some(format!("1:{}", i)),
                name: format!("Frame {}", i),
                node_type: "FRAME".to_string(),
                ..Default::default()
            })
            .collect();
        let root = FigmaNode {
            name: "Page".to_string(),
            node_type: "CANVAS".to_string(),
            children,
            ..Default::default()
        };
        DesignDocument::from_tree(DesignLocator::new("ABC", None), "Shop", root)
    }

    #[test]
    fn test_component_inventory_is_truncated() {
        let doc = document_with_frames(45);
        let prompt = DesignerSkill::default().build_prompt(&DesignerInput::Document(&doc));

        assert!(prompt.contains("## File name\nShop"));
        assert!(prompt.contains("Components (first 30)"));
        assert!(prompt.contains("\"Frame 29\""));
        assert!(!prompt.contains("\"Frame 30\""));
    }

    #[test]
    fn test_custom_limit() {
        let doc = document_with_frames(5);
        let prompt = DesignerSkill::new(2).build_prompt(&DesignerInput::Document(&doc));
        assert!(prompt.contains("Components (first 2)"));
        assert!(!prompt.contains("\"Frame 2\""));
    }

    #[test]
    fn test_image_mode_switches_prompt_and_attaches() {
        let images = vec![DesignImage {
            path: PathBuf::from("shots/home.png"),
            attachment: ImageAttachment::from_bytes("image/png", b"png"),
        }];
        let skill = DesignerSkill::default();
        let input = DesignerInput::Images(&images);

        assert_eq!(skill.system_prompt(&input), prompts::DESIGNER_IMAGES);
        assert!(skill.build_prompt(&input).contains("1. shots/home.png"));
        assert_eq!(skill.images(&input).len(), 1);
        assert!(skill.images(&DesignerInput::Document(&document_with_frames(1))).is_empty());
    }
}
