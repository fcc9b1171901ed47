//! Figcode CLI
//!
//! Runs the design-to-code pipeline from the terminal, prints progress and
//! writes the generated project to disk.

mod export;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use figcode_core::figma::{parse_locator, DesignInput, FigmaClient, FigmaConfig};
use figcode_core::models::LlmProvider;
use figcode_core::skills::prompts;
use figcode_core::swarm::{Coordinator, CoordinatorConfig, PipelineResult, ProgressEvent};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Clone)]
#[command(author, version, about = "Figcode - Figma designs to frontend code")]
struct Args {
    /// Debug-level logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand, Clone)]
enum CliCommand {
    /// Run the pipeline on a Figma URL or on screenshots
    Run {
        /// Figma URL, or one or more image paths (comma or space separated)
        #[arg(required = true, num_args = 1..)]
        source: Vec<String>,
        /// Directory receiving the timestamped export
        #[arg(short, long, default_value = "output")]
        out: PathBuf,
        /// Model for every stage
        #[arg(short, long)]
        model: Option<String>,
        /// anthropic or openai
        #[arg(short, long)]
        provider: Option<LlmProvider>,
        /// Base URL for OpenAI-compatible endpoints
        #[arg(long)]
        base_url: Option<String>,
        /// JSON file with a CoordinatorConfig
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Fail a stage whose output lacks any schema key
        #[arg(long)]
        strict: bool,
        /// Model API key (defaults to the provider's environment variable)
        #[arg(long)]
        api_key: Option<String>,
        /// Figma access token (defaults to FIGMA_ACCESS_TOKEN)
        #[arg(long)]
        figma_token: Option<String>,
    },
    /// Print the file key and node id of a Figma URL
    ParseUrl { url: String },
    /// List the embedded stage prompts, or print one
    Prompts { slug: Option<String> },
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose {
        "figcode_core=debug,figcode=debug"
    } else {
        "figcode_core=info,figcode=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// One argument is a URL or a comma-separated path list; several arguments
/// are image paths.
fn design_input(sources: &[String]) -> DesignInput {
    match sources {
        [single] => DesignInput::from_source(single),
        many => DesignInput::Images {
            paths: many.iter().map(PathBuf::from).collect(),
        },
    }
}

async fn load_config(path: Option<&Path>) -> Result<CoordinatorConfig> {
    match path {
        Some(path) => {
            let text = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            serde_json::from_str(&text).with_context(|| format!("Invalid config file: {:?}", path))
        }
        None => Ok(CoordinatorConfig::default()),
    }
}

fn render_progress(event: &ProgressEvent) -> String {
    if event.is_error() {
        format!("[ error] {}", event.message)
    } else {
        format!(
            "[{:>5.0}%] {:<9} {}",
            event.progress * 100.0,
            event.stage.label(),
            event.message
        )
    }
}

fn print_summary(result: &PipelineResult) {
    if let Some(review) = &result.review {
        println!(
            "Review: score {} / 100, {}",
            review.score,
            if review.approved { "approved" } else { "needs work" }
        );
        if !review.summary.is_empty() {
            println!("   {}", review.summary);
        }
        for issue in review.critical_issues() {
            println!("   critical: {} ({})", issue.description, issue.file);
        }
    }
    if let Some(code) = &result.generated_code {
        if !code.dependencies.is_empty() {
            println!("Dependencies: {}", code.dependencies.join(", "));
        }
        if !code.setup_notes.is_empty() {
            println!("Setup: {}", code.setup_notes);
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_pipeline(
    sources: Vec<String>,
    out: PathBuf,
    model: Option<String>,
    provider: Option<LlmProvider>,
    base_url: Option<String>,
    config_path: Option<PathBuf>,
    strict: bool,
    api_key: Option<String>,
    figma_token: Option<String>,
) -> Result<()> {
    let input = design_input(&sources);
    let mut config = load_config(config_path.as_deref()).await?;

    if let Some(provider) = provider {
        if provider != config.model.provider && model.is_none() {
            config.model.model = provider.default_model().to_string();
        }
        config.model.provider = provider;
    }
    if let Some(model) = model {
        config.model.model = model;
    }
    if base_url.is_some() {
        config.model.base_url = base_url;
    }
    config.strict_schema |= strict;

    let key_env = config.model.provider.api_key_env();
    let api_key = api_key
        .or_else(|| std::env::var(key_env).ok())
        .with_context(|| format!("No API key: pass --api-key or set {}", key_env))?;
    config.model.api_key = Some(api_key);

    let figma_token = figma_token
        .or_else(|| std::env::var("FIGMA_ACCESS_TOKEN").ok())
        .unwrap_or_default();
    if matches!(input, DesignInput::Url { .. }) && figma_token.is_empty() {
        bail!("No Figma token: pass --figma-token or set FIGMA_ACCESS_TOKEN");
    }
    let figma = FigmaClient::new(FigmaConfig::new(figma_token))?
        .with_retry_policy(config.retry.clone());

    tracing::info!(provider = ?config.model.provider, model = %config.model.model, "Starting pipeline");
    let coordinator = Coordinator::new(config, Arc::new(figma))?
        .with_progress(|event| println!("{}", render_progress(event)));

    let result = coordinator.run(&input).await;

    if let Some(error) = &result.error {
        bail!("Pipeline failed: {}", error);
    }
    print_summary(&result);

    let dir = export::export_dir(&out, chrono::Local::now());
    let summary = export::write_export(&dir, &result).await?;
    println!(
        "Wrote {} files to {}",
        summary.written.len(),
        summary.dir.display()
    );
    if !summary.rejected.is_empty() {
        println!("Skipped unsafe paths: {}", summary.rejected.join(", "));
    }
    if !result.success() {
        bail!("Reviewer returned an empty review");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    init_tracing(args.verbose);

    match args.command {
        CliCommand::Run {
            source,
            out,
            model,
            provider,
            base_url,
            config,
            strict,
            api_key,
            figma_token,
        } => {
            run_pipeline(
                source,
                out,
                model,
                provider,
                base_url,
                config,
                strict,
                api_key,
                figma_token,
            )
            .await
        }
        CliCommand::ParseUrl { url } => {
            let locator = parse_locator(&url)?;
            println!("file_key: {}", locator.file_key);
            println!("node_id:  {}", locator.node_id.as_deref().unwrap_or("-"));
            Ok(())
        }
        CliCommand::Prompts { slug: None } => {
            for (slug, content) in prompts::all_defaults() {
                let title = content.lines().next().unwrap_or_default().trim_start_matches("# ");
                println!("{:<16} {}", slug, title);
            }
            Ok(())
        }
        CliCommand::Prompts { slug: Some(slug) } => match prompts::by_slug(&slug) {
            Some(content) => {
                println!("{}", content);
                Ok(())
            }
            None => bail!("Unknown prompt '{}'", slug),
        },
    }
}
