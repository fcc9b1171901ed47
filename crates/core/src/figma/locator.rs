//! # Design Locators
//!
//! Parses Figma share URLs into a file key and optional node id, and models
//! the two accepted pipeline inputs: a URL or a set of local screenshots.

use super::FigmaError;
use regex::Regex;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::OnceLock;

fn file_key_pattern() -> &'static Regex {
    static KEY: OnceLock<Regex> = OnceLock::new();
    KEY.get_or_init(|| Regex::new(r"/(?:file|design)/([a-zA-Z0-9]+)").expect("static key pattern"))
}

/// Points at a whole Figma file or one node inside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignLocator {
    pub file_key: String,
    #[serde(default)]
    pub node_id: Option<String>,
}

impl DesignLocator {
    pub fn new(file_key: impl Into<String>, node_id: Option<String>) -> Self {
        Self {
            file_key: file_key.into(),
            node_id,
        }
    }
}

impl std::fmt::Display for DesignLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.node_id {
            Some(node) => write!(f, "{}#{}", self.file_key, node),
            None => write!(f, "{}", self.file_key),
        }
    }
}

/// Extract `(file_key, node_id)` from a Figma URL.
///
/// `https://www.figma.com/design/ABC123/My-File?node-id=1-2` yields file key
/// `ABC123` and node id `1-2`.
pub fn parse_locator(url: &str) -> Result<DesignLocator, FigmaError> {
    let parsed = Url::parse(url).map_err(|_| FigmaError::InvalidLocator(url.to_string()))?;

    let file_key = file_key_pattern()
        .captures(parsed.path())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| FigmaError::InvalidLocator(url.to_string()))?;

    let node_id = parsed
        .query_pairs()
        .find(|(key, _)| key == "node-id")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty());

    Ok(DesignLocator { file_key, node_id })
}

/// What the pipeline is asked to convert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DesignInput {
    /// A Figma file or node URL.
    Url { url: String },
    /// Screenshots on local disk, analysed directly by the designer stage.
    Images { paths: Vec<PathBuf> },
}

impl DesignInput {
    /// Interpret a CLI-style source: anything starting with `http` is a URL,
    /// otherwise a comma-separated list of image paths.
    pub fn from_source(source: &str) -> Self {
        let source = source.trim();
        if source.starts_with("http") {
            DesignInput::Url {
                url: source.to_string(),
            }
        } else {
            DesignInput::Images {
                paths: source
                    .split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(PathBuf::from)
                    .collect(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_design_url_with_node() {
        let locator =
            parse_locator("https://www.figma.com/design/ABC123/My-File?node-id=1-2").unwrap();
        assert_eq!(locator.file_key, "ABC123");
        assert_eq!(locator.node_id.as_deref(), Some("1-2"));
    }

    #[test]
    fn test_parse_file_url_without_node() {
        let locator = parse_locator("https://www.figma.com/file/XyZ789/Landing").unwrap();
        assert_eq!(locator, DesignLocator::new("XyZ789", None));
    }

    #[test]
    fn test_parse_decodes_encoded_node_id() {
        let locator =
            parse_locator("https://www.figma.com/file/K1/x?t=abc&node-id=12%3A34").unwrap();
        assert_eq!(locator.node_id.as_deref(), Some("12:34"));
    }

    #[test]
    fn test_parse_rejects_other_paths() {
        let err = parse_locator("https://www.figma.com/proto/ABC123/Flow").unwrap_err();
        assert!(matches!(err, FigmaError::InvalidLocator(_)));

        let err = parse_locator("not a url").unwrap_err();
        assert!(matches!(err, FigmaError::InvalidLocator(_)));
    }

    #[test]
    fn test_design_input_from_source() {
        assert_eq!(
            DesignInput::from_source("https://figma.com/design/A1/x"),
            DesignInput::Url {
                url: "https://figma.com/design/A1/x".into()
            }
        );
        assert_eq!(
            DesignInput::from_source("./top.png, ./footer.png"),
            DesignInput::Images {
                paths: vec![PathBuf::from("./top.png"), PathBuf::from("./footer.png")]
            }
        );
    }

    #[test]
    fn test_locator_display() {
        assert_eq!(DesignLocator::new("K", Some("1:2".into())).to_string(), "K#1:2");
    }
}
