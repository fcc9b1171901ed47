//! # Export
//!
//! Writes a finished run to disk: every generated file plus the stage
//! artifacts as pretty JSON.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local};
use figcode_core::swarm::PipelineResult;
use serde_json::Value;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// Where a run was written and what was skipped.
#[derive(Debug)]
pub struct ExportSummary {
    pub dir: PathBuf,
    pub written: Vec<PathBuf>,
    /// Generated paths refused because they would escape `dir`.
    pub rejected: Vec<String>,
}

/// `<root>/figcode-YYYYmmdd-HHMMSS`
pub fn export_dir(root: &Path, now: DateTime<Local>) -> PathBuf {
    root.join(format!("figcode-{}", now.format("%Y%m%d-%H%M%S")))
}

/// Relative path under the export directory, or an error for absolute paths
/// and anything containing `..`.
pub fn safe_relative_path(path: &str) -> Result<PathBuf> {
    let candidate = Path::new(path);
    let mut clean = PathBuf::new();
    for component in candidate.components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                bail!("refusing to write outside the export directory: {}", path)
            }
        }
    }
    if clean.as_os_str().is_empty() {
        bail!("empty output path");
    }
    Ok(clean)
}

async fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }
    fs::write(path, content)
        .await
        .with_context(|| format!("Failed to write file: {:?}", path))
}

async fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value)
        .with_context(|| format!("Failed to serialize {:?}", path.file_name()))?;
    write_file(path, &text).await
}

/// Write `result` into `dir`.
pub async fn write_export(dir: &Path, result: &PipelineResult) -> Result<ExportSummary> {
    let mut summary = ExportSummary {
        dir: dir.to_path_buf(),
        written: Vec::new(),
        rejected: Vec::new(),
    };

    for file in result.files() {
        let name = if file.path.trim().is_empty() {
            "unknown.tsx"
        } else {
            file.path.as_str()
        };
        match safe_relative_path(name) {
            Ok(relative) => {
                let target = dir.join(relative);
                write_file(&target, &file.content).await?;
                summary.written.push(target);
            }
            Err(e) => {
                tracing::warn!(path = %file.path, error = %e, "Skipping generated file");
                summary.rejected.push(file.path.clone());
            }
        }
    }

    let artifacts = [
        ("design-analysis.json", to_value(&result.design_analysis)?),
        ("architecture.json", to_value(&result.architecture)?),
        ("review.json", to_value(&result.review)?),
        ("design-data.json", to_value(&result.design_document)?),
    ];
    for (name, value) in artifacts {
        if value.is_null() {
            continue;
        }
        let target = dir.join(name);
        write_json(&target, &value).await?;
        summary.written.push(target);
    }

    tracing::info!(dir = ?dir, files = summary.written.len(), "Export written");
    Ok(summary)
}

fn to_value<T: serde::Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).context("Failed to serialize artifact")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use figcode_core::skills::artifact_registry::{
        Artifact, DesignAnalysis, GeneratedCode, GeneratedFile,
    };
    use serde_json::json;

    fn file(path: &str, content: &str) -> GeneratedFile {
        GeneratedFile {
            path: path.to_string(),
            content: content.to_string(),
            description: String::new(),
        }
    }

    #[test]
    fn test_safe_relative_path() {
        assert_eq!(
            safe_relative_path("./src/components/Hero.tsx").unwrap(),
            PathBuf::from("src/components/Hero.tsx")
        );
        assert!(safe_relative_path("/etc/passwd").is_err());
        assert!(safe_relative_path("src/../../escape.ts").is_err());
        assert!(safe_relative_path("").is_err());
        assert!(safe_relative_path(".").is_err());
    }

    #[test]
    fn test_export_dir_is_timestamped() {
        let now = Local.with_ymd_and_hms(2026, 3, 7, 9, 5, 1).unwrap();
        assert_eq!(
            export_dir(Path::new("out"), now),
            PathBuf::from("out/figcode-20260307-090501")
        );
    }

    #[tokio::test]
    async fn test_write_export() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("run");

        let mut result = PipelineResult::new();
        result.design_analysis = Some(
            DesignAnalysis {
                design_summary: "Landing".to_string(),
                ..Default::default()
            }
            .into(),
        );
        result.generated_code = Some(
            GeneratedCode {
                files: vec![
                    file("src/app/page.tsx", "export default function Page() {}"),
                    file("../outside.ts", "nope"),
                    file("/abs.ts", "nope"),
                ],
                ..Default::default()
            }
            .into(),
        );
        result.review = Some(Artifact::from_raw(json!({
            "score": "90",
            "approved": true,
            "verdict": "ship it"
        })));

        let summary = write_export(&dir, &result).await.unwrap();

        assert_eq!(summary.rejected, vec!["../outside.ts", "/abs.ts"]);
        let page = std::fs::read_to_string(dir.join("src/app/page.tsx")).unwrap();
        assert_eq!(page, "export default function Page() {}");
        assert!(!tmp.path().join("outside.ts").exists());

        let analysis: Value =
            serde_json::from_str(&std::fs::read_to_string(dir.join("design-analysis.json")).unwrap()).unwrap();
        assert_eq!(analysis["design_summary"], "Landing");
        let review: Value =
            serde_json::from_str(&std::fs::read_to_string(dir.join("review.json")).unwrap()).unwrap();
        assert_eq!(review["score"], "90");
        assert_eq!(review["verdict"], "ship it");
        // Never produced, so never written.
        assert!(!dir.join("architecture.json").exists());
        assert!(!dir.join("design-data.json").exists());
    }
}
