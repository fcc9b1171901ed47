//! # Token Extraction
//!
//! One pre-order walk over a [`FigmaNode`] tree derives colors, fonts and the
//! component inventory. Every subtree returns its own sets which the parent
//! merges, so no accumulator is shared across calls.

use super::{ComponentSummary, FigmaNode, FontSpec, Rgba};
use std::collections::BTreeSet;

/// Node types reported in the component inventory.
pub const COMPONENT_TYPES: [&str; 4] = ["FRAME", "COMPONENT", "INSTANCE", "GROUP"];

/// Everything derived from one tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DesignTokens {
    pub colors: Vec<String>,
    pub fonts: Vec<FontSpec>,
    pub components: Vec<ComponentSummary>,
}

/// Sets gathered from one subtree.
struct Subtree {
    colors: BTreeSet<String>,
    fonts: BTreeSet<FontSpec>,
    components: Vec<ComponentSummary>,
}

/// Run all three extractors in a single traversal.
pub fn collect_tokens(root: &FigmaNode) -> DesignTokens {
    let found = walk(root, 0);

    tracing::debug!(
        colors = found.colors.len(),
        fonts = found.fonts.len(),
        components = found.components.len(),
        "Extracted design tokens"
    );

    DesignTokens {
        colors: found.colors.into_iter().collect(),
        fonts: found.fonts.into_iter().collect(),
        components: found.components,
    }
}

fn walk(node: &FigmaNode, depth: usize) -> Subtree {
    let mut found = Subtree {
        colors: node
            .fills
            .iter()
            .filter_map(|fill| fill.color)
            .map(format_color)
            .collect(),
        fonts: node_font(node).into_iter().collect(),
        components: component_summary(node, depth).into_iter().collect(),
    };

    for child in &node.children {
        let sub = walk(child, depth + 1);
        found.colors.extend(sub.colors);
        found.fonts.extend(sub.fonts);
        found.components.extend(sub.components);
    }
    found
}

/// Sorted, deduplicated colors of `root` and its descendants.
pub fn extract_colors(root: &FigmaNode) -> Vec<String> {
    collect_tokens(root).colors
}

/// Sorted, deduplicated font triples of `root` and its descendants.
pub fn extract_fonts(root: &FigmaNode) -> Vec<FontSpec> {
    collect_tokens(root).fonts
}

/// Frames, components, instances and groups in pre-order.
pub fn extract_components(root: &FigmaNode) -> Vec<ComponentSummary> {
    collect_tokens(root).components
}

/// `#rrggbb` when fully opaque, `rgba(r,g,b,a.aa)` otherwise.
pub fn format_color(color: Rgba) -> String {
    let r = channel(color.r);
    let g = channel(color.g);
    let b = channel(color.b);
    if color.a < 1.0 {
        format!("rgba({},{},{},{:.2})", r, g, b, color.a)
    } else {
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }
}

/// Truncating `[0, 1] -> [0, 255]` conversion.
fn channel(value: f64) -> u8 {
    (value * 255.0) as u8
}

fn node_font(node: &FigmaNode) -> Option<FontSpec> {
    let style = node.style.as_ref()?;
    let family = style.font_family.as_ref().filter(|f| !f.is_empty())?;
    Some(FontSpec {
        family: family.clone(),
        size: style.font_size.unwrap_or(FontSpec::DEFAULT_SIZE),
        weight: style.font_weight.unwrap_or(FontSpec::DEFAULT_WEIGHT),
    })
}

fn component_summary(node: &FigmaNode, depth: usize) -> Option<ComponentSummary> {
    if !COMPONENT_TYPES.contains(&node.node_type.as_str()) {
        return None;
    }
    let bbox = node.absolute_bounding_box;
    Some(ComponentSummary {
        name: node.name.clone(),
        node_type: node.node_type.clone(),
        depth,
        width: bbox.map(|b| b.width),
        height: bbox.map(|b| b.height),
        child_count: node.children.len(),
    })
}
