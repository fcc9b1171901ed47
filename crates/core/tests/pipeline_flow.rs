//! End-to-end pipeline runs against in-process model and design stubs.

use async_trait::async_trait;
use figcode_core::figma::{DesignDocument, DesignLocator, DesignSource, FigmaError, FigmaNode};
use figcode_core::llm::{CompletionRequest, LlmBackend, LlmError};
use figcode_core::retry::RetryPolicy;
use figcode_core::skills::prompts;
use figcode_core::swarm::{Coordinator, CoordinatorConfig, PipelineStage, ProgressEvent};
use serde_json::json;
use std::sync::{Arc, Mutex};

const URL: &str = "https://www.figma.com/design/ABC123/Storefront?node-id=1-2";

/// Design source returning a fixed tree: 3 colors, 2 fonts, 5 components.
struct StorefrontSource;

#[async_trait]
impl DesignSource for StorefrontSource {
    async fn fetch(&self, locator: &DesignLocator) -> Result<DesignDocument, FigmaError> {
        let text = |size: u32, weight: u32| {
            json!({"type": "TEXT", "name": "Label", "style": {"fontFamily": "Inter", "fontSize": size, "fontWeight": weight}})
        };
        let card = |name: &str| {
            json!({"type": "INSTANCE", "name": name, "children": [text(16, 400)],
                   "absoluteBoundingBox": {"x": 0, "y": 0, "width": 320, "height": 200}})
        };
        let tree = json!({
            "type": "FRAME",
            "name": "Storefront",
            "fills": [{"type": "SOLID", "color": {"r": 1, "g": 0, "b": 0, "a": 1}}],
            "children": [
                {
                    "type": "FRAME",
                    "name": "Header",
                    "fills": [{"type": "SOLID", "color": {"r": 1, "g": 1, "b": 1, "a": 1}}],
                    "children": [text(32, 700)]
                },
                {
                    "type": "GROUP",
                    "name": "Cards",
                    "fills": [{"type": "SOLID", "color": {"r": 0, "g": 0, "b": 1, "a": 0.5}}],
                    "children": [card("Card A"), card("Card B")]
                }
            ]
        });
        let root: FigmaNode =
            serde_json::from_value(tree).map_err(|e| FigmaError::Decode(e.to_string()))?;
        Ok(DesignDocument::from_tree(locator.clone(), "Storefront", root))
    }
}

/// Answers each stage with a fixed, schema-complete JSON object. Stages named
/// in `failing` get a non-retryable rejection instead.
struct EchoBackend {
    failing: Option<&'static str>,
    stages: Mutex<Vec<&'static str>>,
}

impl EchoBackend {
    fn new(failing: Option<&'static str>) -> Self {
        Self {
            failing,
            stages: Mutex::new(Vec::new()),
        }
    }

    fn stages(&self) -> Vec<&'static str> {
        self.stages.lock().unwrap().clone()
    }
}

fn stage_of(request: &CompletionRequest) -> &'static str {
    [
        ("designer", prompts::DESIGNER),
        ("architect", prompts::ARCHITECT),
        ("coder", prompts::CODER),
        ("reviewer", prompts::REVIEWER),
    ]
    .into_iter()
    .find(|(_, prompt)| request.system == *prompt)
    .map(|(stage, _)| stage)
    .unwrap_or("unknown")
}

fn canned(stage: &str) -> serde_json::Value {
    match stage {
        "designer" => json!({
            "design_summary": "Storefront with header and product cards",
            "color_palette": {"primary": "#ff0000", "secondary": "#ffffff", "background": "#ffffff",
                              "text": "#000000", "accent": "#0000ff", "additional": []},
            "typography": [{"role": "heading-1", "font_family": "Inter", "font_size": "32px", "font_weight": 700, "line_height": "40px"}],
            "spacing": {"unit": 4, "scale": [4, 8, 16]},
            "layout": {"type": "grid", "max_width": "1280px", "columns": 12, "gutter": "24px",
                       "breakpoints": {"mobile": 375, "desktop": 1280}},
            "components": [{"name": "Header", "type": "navigation", "description": "Top bar", "children": []},
                           {"name": "ProductCard", "type": "card", "description": "Card", "children": []}]
        }),
        "architect" => json!({
            "project_name": "storefront",
            "tech_stack": {"framework": "Next.js 14+ (App Router)", "styling": "Tailwind CSS",
                           "ui_library": "shadcn/ui", "language": "TypeScript"},
            "tailwind_config": {"colors": {"primary": "#ff0000"}, "fonts": {"heading": "Inter", "body": "Inter"}},
            "file_structure": [{"path": "src/components/Header.tsx", "description": "Header"}],
            "components": [{"name": "Header", "file_path": "src/components/Header.tsx", "type": "server",
                            "description": "Top bar", "props": [], "children": [], "shadcn_components": []}],
            "pages": [{"path": "src/app/page.tsx", "description": "Home", "components": ["Header"]}]
        }),
        "coder" => json!({
            "files": [
                {"path": "src/components/Header.tsx", "content": "export default function Header() { return <header />; }", "description": "Header"},
                {"path": "src/app/page.tsx", "content": "import Header from '@/components/Header';", "description": "Home"}
            ],
            "dependencies": ["clsx"],
            "setup_notes": "Run npx shadcn init."
        }),
        _ => json!({
            "score": 86,
            "approved": true,
            "summary": "Faithful to the design.",
            "categories": {
                "code_quality": {"score": 88, "notes": "Clean"},
                "design_fidelity": {"score": 85, "notes": "Close"},
                "accessibility": {"score": 84, "notes": "Landmarks present"},
                "responsiveness": {"score": 87, "notes": "Breakpoints used"}
            },
            "issues": [{"severity": "info", "file": "src/app/page.tsx", "description": "No metadata", "suggestion": "Export metadata"}],
            "improvements": ["Add loading states"]
        }),
    }
}

#[async_trait]
impl LlmBackend for EchoBackend {
    fn name(&self) -> &str {
        "echo"
    }

    fn model(&self) -> &str {
        "echo-1"
    }

    async fn send(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let stage = stage_of(request);
        self.stages.lock().unwrap().push(stage);
        if self.failing == Some(stage) {
            return Err(LlmError::Rejected {
                status: 400,
                message: "prompt is too long".to_string(),
            });
        }
        Ok(format!("```json\n{}\n```", canned(stage)))
    }
}

fn coordinator(backend: Arc<EchoBackend>, events: Arc<Mutex<Vec<ProgressEvent>>>) -> Coordinator {
    let config = CoordinatorConfig {
        retry: RetryPolicy::immediate(3),
        ..Default::default()
    };
    Coordinator::with_backend(config, backend, Arc::new(StorefrontSource))
        .with_progress(move |event| events.lock().unwrap().push(event.clone()))
}

#[tokio::test]
async fn test_happy_path_populates_every_artifact() {
    let backend = Arc::new(EchoBackend::new(None));
    let events = Arc::new(Mutex::new(Vec::new()));

    let result = coordinator(backend.clone(), events.clone()).run_url(URL).await;

    assert!(result.error.is_none(), "unexpected error: {:?}", result.error);
    assert!(result.success());
    assert_eq!(result.current_stage, PipelineStage::Done);

    let doc = result.design_document.as_ref().unwrap();
    assert_eq!(doc.colors, vec!["#ff0000", "#ffffff", "rgba(0,0,255,0.50)"]);
    assert_eq!(doc.fonts.len(), 2);
    let names: Vec<&str> = doc.components.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Storefront", "Header", "Cards", "Card A", "Card B"]);
    assert_eq!(doc.locator.node_id.as_deref(), Some("1-2"));

    assert_eq!(
        result.design_analysis.as_ref().unwrap().color_palette.primary.as_deref(),
        Some("#ff0000")
    );
    assert_eq!(result.architecture.as_ref().unwrap().project_name, "storefront");
    assert_eq!(result.files().len(), 2);
    assert_eq!(result.review.as_ref().unwrap().score, 86.0);

    assert_eq!(backend.stages(), vec!["designer", "architect", "coder", "reviewer"]);

    let events = events.lock().unwrap();
    let last = events.last().unwrap();
    assert_eq!(last.stage, PipelineStage::Done);
    assert_eq!(last.progress, 1.0);
    assert!(events.iter().all(|e| (0.0..=1.0).contains(&e.progress)));

    tokio_test::assert_ok!(serde_json::to_string(&result));
}

#[tokio::test]
async fn test_architect_failure_halts_pipeline() {
    let backend = Arc::new(EchoBackend::new(Some("architect")));
    let events = Arc::new(Mutex::new(Vec::new()));

    let result = coordinator(backend.clone(), events.clone()).run_url(URL).await;

    assert!(result.design_analysis.is_some());
    assert!(result.architecture.is_none());
    assert!(result.generated_code.is_none());
    assert!(result.review.is_none());
    assert!(!result.success());

    let error = result.error.as_deref().unwrap();
    assert!(error.starts_with("[architect] "), "error was {}", error);
    assert!(error.contains("prompt is too long"));
    assert_eq!(result.current_stage, PipelineStage::Architect);

    // Rejections are fatal: one architect attempt, nothing after it.
    assert_eq!(backend.stages(), vec!["designer", "architect"]);
    assert_eq!(
        result.completed_stages(),
        vec![PipelineStage::Fetch, PipelineStage::Designer]
    );

    let events = events.lock().unwrap();
    let last = events.last().unwrap();
    assert_eq!(last.stage, PipelineStage::Error);
    assert_eq!(last.progress, -1.0);
}

#[tokio::test]
async fn test_concurrent_runs_are_independent() {
    let first = Arc::new(EchoBackend::new(None));
    let second = Arc::new(EchoBackend::new(Some("coder")));

    let a = coordinator(first, Arc::new(Mutex::new(Vec::new())));
    let b = coordinator(second, Arc::new(Mutex::new(Vec::new())));
    let (ra, rb) = tokio::join!(a.run_url(URL), b.run_url(URL));

    assert!(ra.success());
    assert!(rb.error.as_deref().unwrap_or("").starts_with("[coder]"));
    assert!(rb.architecture.is_some());
}
