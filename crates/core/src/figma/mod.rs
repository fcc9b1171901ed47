//! # Figma
//!
//! Locator parsing, the REST client, and design-token extraction.
//!
//! ```text
//! URL ──parse_locator──▶ DesignLocator ──FigmaClient──▶ FigmaNode tree
//!                                                        │
//!                                     collect_tokens ◀───┘
//!                                          │
//!                                   DesignDocument (colors, fonts, components)
//! ```

pub mod client;
pub mod document;
pub mod error;
pub mod extract;
pub mod images;
pub mod locator;
pub mod node;

pub use client::{DesignSource, FigmaAuthScheme, FigmaClient, FigmaConfig, ImageFormat};
pub use document::{ComponentSummary, DesignDocument, FontSpec};
pub use error::FigmaError;
pub use extract::{collect_tokens, extract_colors, extract_components, extract_fonts, format_color, DesignTokens};
pub use images::{load_images, DesignImage};
pub use locator::{parse_locator, DesignInput, DesignLocator};
pub use node::{BoundingBox, FigmaNode, Paint, Rgba, TypeStyle};
