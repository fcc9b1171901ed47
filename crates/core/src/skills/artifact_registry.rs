//! # Artifact Registry
//!
//! Output records of the four stages. A stage hands on an [`Artifact`]: the
//! object the model returned, untouched, plus a typed view of it. The view is
//! read leniently. Absent fields and fields of the wrong type fall back to
//! defaults, and keys the record does not name are kept in `extra`.

use schemars::JsonSchema;
use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::ops::Deref;

/// Score at or above which a review counts as approved.
pub const APPROVAL_THRESHOLD: f64 = 80.0;

// ============================================================================
// Stage Artifact
// ============================================================================

/// A stage's output as the model returned it, with a typed view over it.
///
/// The raw object is what later prompts, the pipeline result and exports
/// see. Serializing an artifact writes the raw object back out.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact<T> {
    raw: Value,
    view: T,
}

impl<T: DeserializeOwned + Default> Artifact<T> {
    pub fn from_raw(raw: Value) -> Self {
        let view = T::deserialize(&raw).unwrap_or_else(|e| {
            tracing::debug!(error = %e, "Output has no typed view, using defaults");
            T::default()
        });
        Self { raw, view }
    }
}

impl<T> Artifact<T> {
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn view(&self) -> &T {
        &self.view
    }

    pub fn into_raw(self) -> Value {
        self.raw
    }

    /// Top-level value of the raw object, if present.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.raw.get(key)
    }

    /// True when the model returned an object without keys.
    pub fn is_empty(&self) -> bool {
        match &self.raw {
            Value::Object(map) => map.is_empty(),
            Value::Null => true,
            _ => false,
        }
    }
}

impl<T: Default> Default for Artifact<T> {
    fn default() -> Self {
        Self {
            raw: Value::Object(Map::new()),
            view: T::default(),
        }
    }
}

impl<T> Deref for Artifact<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.view
    }
}

impl<T: Serialize> From<T> for Artifact<T> {
    fn from(view: T) -> Self {
        let raw = serde_json::to_value(&view).unwrap_or(Value::Null);
        Self { raw, view }
    }
}

impl<T> Serialize for Artifact<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

impl<'de, T: DeserializeOwned + Default> Deserialize<'de> for Artifact<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from_raw)
    }
}

/// Field readers that never reject a value, only fall back to a default.
mod lenient {
    use serde::de::{DeserializeOwned, Deserializer};
    use serde::Deserialize;
    use serde_json::Value;
    use std::collections::BTreeMap;

    pub fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned + Default,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(T::deserialize(value).unwrap_or_default())
    }

    fn as_text(value: Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(as_text(Value::deserialize(deserializer)?).unwrap_or_default())
    }

    pub fn opt_text<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        Ok(as_text(Value::deserialize(deserializer)?))
    }

    /// Numbers, and strings holding one (`"85"`).
    pub fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Number(n) => n.as_f64().unwrap_or_default(),
            Value::String(s) => s.trim().parse().unwrap_or_default(),
            _ => 0.0,
        })
    }

    /// Booleans, and `"true"` in any case.
    pub fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Bool(b) => b,
            Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
            _ => false,
        })
    }

    /// Array elements that fit `T`; anything but an array reads as empty.
    pub fn list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|item| T::deserialize(item).ok())
                .collect(),
            _ => Vec::new(),
        })
    }

    /// Object entries whose value fits `T`.
    pub fn entries<'de, D, T>(deserializer: D) -> Result<BTreeMap<String, T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Object(map) => map
                .into_iter()
                .filter_map(|(key, value)| T::deserialize(value).ok().map(|v| (key, v)))
                .collect(),
            _ => BTreeMap::new(),
        })
    }
}

/// A size the model may write as a number (`24`) or a string (`"24px"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Measure {
    Number(f64),
    Text(String),
}

impl Measure {
    /// Numeric value, reading a leading number out of strings like `"24px"`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Measure::Number(n) => Some(*n),
            Measure::Text(s) => {
                let end = s
                    .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-'))
                    .unwrap_or(s.len());
                s[..end].parse().ok()
            }
        }
    }
}

// ============================================================================
// Designer Artifacts
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ColorPalette {
    #[serde(deserialize_with = "lenient::opt_text")]
    pub primary: Option<String>,
    #[serde(deserialize_with = "lenient::opt_text")]
    pub secondary: Option<String>,
    #[serde(deserialize_with = "lenient::opt_text")]
    pub background: Option<String>,
    #[serde(deserialize_with = "lenient::opt_text")]
    pub text: Option<String>,
    #[serde(deserialize_with = "lenient::opt_text")]
    pub accent: Option<String>,
    /// Colors that did not fit a named slot.
    #[serde(deserialize_with = "lenient::list")]
    pub additional: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One entry of the typography scale, e.g. `heading-1` or `body`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct TypographyRole {
    #[serde(deserialize_with = "lenient::text")]
    pub role: String,
    #[serde(deserialize_with = "lenient::text")]
    pub font_family: String,
    #[serde(deserialize_with = "lenient::or_default")]
    pub font_size: Option<Measure>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub font_weight: Option<Measure>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub line_height: Option<Measure>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Spacing {
    /// Base unit in pixels.
    #[serde(deserialize_with = "lenient::or_default")]
    pub unit: Option<Measure>,
    #[serde(deserialize_with = "lenient::list")]
    pub scale: Vec<Measure>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Layout {
    /// grid, flex, stack or mixed
    #[serde(rename = "type", deserialize_with = "lenient::opt_text")]
    pub layout_type: Option<String>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub max_width: Option<Measure>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub columns: Option<Measure>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub gutter: Option<Measure>,
    #[serde(deserialize_with = "lenient::entries")]
    pub breakpoints: BTreeMap<String, Measure>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A component identified in the design, with semantic type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DesignComponent {
    #[serde(deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(rename = "type", deserialize_with = "lenient::opt_text")]
    pub component_type: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub description: String,
    #[serde(deserialize_with = "lenient::list")]
    pub children: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Designer output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DesignAnalysis {
    #[serde(deserialize_with = "lenient::text")]
    pub design_summary: String,
    #[serde(deserialize_with = "lenient::or_default")]
    pub color_palette: ColorPalette,
    #[serde(deserialize_with = "lenient::list")]
    pub typography: Vec<TypographyRole>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub spacing: Spacing,
    #[serde(deserialize_with = "lenient::or_default")]
    pub layout: Layout,
    #[serde(deserialize_with = "lenient::list")]
    pub components: Vec<DesignComponent>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ============================================================================
// Architect Artifacts
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct TechStack {
    #[serde(deserialize_with = "lenient::opt_text")]
    pub framework: Option<String>,
    #[serde(deserialize_with = "lenient::opt_text")]
    pub styling: Option<String>,
    #[serde(deserialize_with = "lenient::opt_text")]
    pub ui_library: Option<String>,
    #[serde(deserialize_with = "lenient::opt_text")]
    pub language: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Design tokens restated as styling configuration. Values stay raw JSON:
/// a color may be a plain string or a shade map like `{"DEFAULT": ...}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DesignTokensConfig {
    #[serde(deserialize_with = "lenient::or_default")]
    pub colors: Map<String, Value>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub fonts: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct FileEntry {
    #[serde(deserialize_with = "lenient::text")]
    pub path: String,
    #[serde(deserialize_with = "lenient::text")]
    pub description: String,
}

/// Where a component renders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RenderTarget {
    /// Rendered on the server, no client interactivity.
    Server,
    /// Interactive, hydrated on the client.
    Client,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PropSpec {
    #[serde(deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(rename = "type", deserialize_with = "lenient::text")]
    pub prop_type: String,
    #[serde(deserialize_with = "lenient::flag")]
    pub required: bool,
    #[serde(deserialize_with = "lenient::text")]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ComponentSpec {
    #[serde(deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(deserialize_with = "lenient::text")]
    pub file_path: String,
    #[serde(rename = "type", deserialize_with = "lenient::or_default")]
    pub render_target: RenderTarget,
    #[serde(deserialize_with = "lenient::text")]
    pub description: String,
    #[serde(deserialize_with = "lenient::list")]
    pub props: Vec<PropSpec>,
    #[serde(deserialize_with = "lenient::list")]
    pub children: Vec<String>,
    /// Library components this one builds on.
    #[serde(deserialize_with = "lenient::list")]
    pub shadcn_components: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PageSpec {
    #[serde(deserialize_with = "lenient::text")]
    pub path: String,
    #[serde(deserialize_with = "lenient::text")]
    pub description: String,
    #[serde(deserialize_with = "lenient::list")]
    pub components: Vec<String>,
}

/// Architect output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Architecture {
    #[serde(deserialize_with = "lenient::text")]
    pub project_name: String,
    #[serde(deserialize_with = "lenient::or_default")]
    pub tech_stack: TechStack,
    #[serde(deserialize_with = "lenient::or_default")]
    pub tailwind_config: DesignTokensConfig,
    #[serde(deserialize_with = "lenient::list")]
    pub file_structure: Vec<FileEntry>,
    #[serde(deserialize_with = "lenient::list")]
    pub components: Vec<ComponentSpec>,
    #[serde(deserialize_with = "lenient::list")]
    pub pages: Vec<PageSpec>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Architecture {
    pub fn component(&self, name: &str) -> Option<&ComponentSpec> {
        self.components.iter().find(|c| c.name == name)
    }
}

// ============================================================================
// Coder Artifacts
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct GeneratedFile {
    #[serde(deserialize_with = "lenient::text")]
    pub path: String,
    #[serde(deserialize_with = "lenient::text")]
    pub content: String,
    #[serde(deserialize_with = "lenient::text")]
    pub description: String,
}

/// Coder output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct GeneratedCode {
    #[serde(deserialize_with = "lenient::list")]
    pub files: Vec<GeneratedFile>,
    /// Extra packages the generated code needs.
    #[serde(deserialize_with = "lenient::list")]
    pub dependencies: Vec<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub setup_notes: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ============================================================================
// Reviewer Artifacts
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct CategoryScore {
    #[serde(deserialize_with = "lenient::number")]
    pub score: f64,
    #[serde(deserialize_with = "lenient::text")]
    pub notes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct CategoryScores {
    #[serde(deserialize_with = "lenient::or_default")]
    pub code_quality: CategoryScore,
    #[serde(deserialize_with = "lenient::or_default")]
    pub design_fidelity: CategoryScore,
    #[serde(deserialize_with = "lenient::or_default")]
    pub accessibility: CategoryScore,
    #[serde(deserialize_with = "lenient::or_default")]
    pub responsiveness: CategoryScore,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
    #[default]
    Info,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Issue {
    #[serde(deserialize_with = "lenient::or_default")]
    pub severity: Severity,
    #[serde(deserialize_with = "lenient::text")]
    pub file: String,
    #[serde(deserialize_with = "lenient::text")]
    pub description: String,
    #[serde(deserialize_with = "lenient::text")]
    pub suggestion: String,
}

/// Reviewer output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ReviewResult {
    /// Overall score, 0 to 100.
    #[serde(deserialize_with = "lenient::number")]
    pub score: f64,
    #[serde(deserialize_with = "lenient::flag")]
    pub approved: bool,
    #[serde(deserialize_with = "lenient::text")]
    pub summary: String,
    #[serde(deserialize_with = "lenient::or_default")]
    pub categories: CategoryScores,
    #[serde(deserialize_with = "lenient::list")]
    pub issues: Vec<Issue>,
    #[serde(deserialize_with = "lenient::list")]
    pub improvements: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ReviewResult {
    /// Whether `score` clears [`APPROVAL_THRESHOLD`].
    pub fn meets_threshold(&self) -> bool {
        self.score >= APPROVAL_THRESHOLD
    }

    /// The reported `approved` flag agrees with the score.
    pub fn approval_consistent(&self) -> bool {
        self.approved == self.meets_threshold()
    }

    pub fn critical_issues(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| i.severity == Severity::Critical)
    }
}
