//! The fetch stage's output: raw tree plus the derived design tokens.

use super::{DesignLocator, FigmaNode};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A distinct `(family, size, weight)` triple found in text styles.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FontSpec {
    pub family: String,
    pub size: f64,
    pub weight: f64,
}

impl FontSpec {
    pub const DEFAULT_SIZE: f64 = 16.0;
    pub const DEFAULT_WEIGHT: f64 = 400.0;
}

impl PartialEq for FontSpec {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FontSpec {}

impl PartialOrd for FontSpec {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FontSpec {
    fn cmp(&self, other: &Self) -> Ordering {
        self.family
            .cmp(&other.family)
            .then_with(|| self.size.total_cmp(&other.size))
            .then_with(|| self.weight.total_cmp(&other.weight))
    }
}

/// A frame/component/instance/group encountered during traversal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ComponentSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub depth: usize,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub child_count: usize,
}

/// Design data handed to the designer stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignDocument {
    pub locator: DesignLocator,
    pub name: String,
    pub document: FigmaNode,
    /// Sorted, deduplicated `#rrggbb` / `rgba(r,g,b,a)` strings.
    pub colors: Vec<String>,
    /// Sorted, deduplicated font triples.
    pub fonts: Vec<FontSpec>,
    /// Pre-order traversal order.
    pub components: Vec<ComponentSummary>,
}

impl DesignDocument {
    /// Build a document by running the token extractors over `document`.
    pub fn from_tree(locator: DesignLocator, name: impl Into<String>, document: FigmaNode) -> Self {
        let tokens = super::extract::collect_tokens(&document);
        Self {
            locator,
            name: name.into(),
            document,
            colors: tokens.colors,
            fonts: tokens.fonts,
            components: tokens.components,
        }
    }
}
