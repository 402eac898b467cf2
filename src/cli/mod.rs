//! Command-line interface for figgen.
//!
//! Thin callers of the scheduler's submit/status/fetch_artifact contract:
//! `generate` is a blocking-poll wrapper, `serve` exposes the same contract
//! over HTTP.

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use uuid::Uuid;

use crate::api::{self, ApiState};
use crate::catalog::ReferenceCatalog;
use crate::config::Settings;
use crate::core::{Orchestrator, Scheduler};
use crate::domain::{DiagramKind, GenerationRequest, TaskStatus};
use crate::providers::{GeminiProvider, Provider, RetryProvider};
use crate::retrieval::Retriever;
use crate::storage::{ArtifactStore, FsStore};

const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// figgen - async orchestrator for publication-quality figure generation
#[derive(Parser, Debug)]
#[command(name = "figgen")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (defaults to ./figgen.yaml, then ~/.figgen/config.yaml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP service
    Serve {
        /// Address to bind to (overrides config)
        #[arg(short, long)]
        address: Option<String>,
    },

    /// Generate a figure and wait for the result
    Generate {
        /// Source text file (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Communicative intent (what the figure should convey)
        #[arg(short = 'n', long)]
        intent: String,

        /// Kind of figure
        #[arg(short, long, value_enum, default_value_t = KindArg::Methodology)]
        kind: KindArg,

        /// Raw data JSON file (for statistical plots)
        #[arg(long)]
        data: Option<PathBuf>,

        /// Override the maximum refinement rounds
        #[arg(long)]
        rounds: Option<u32>,

        /// Where to write the generated image
        #[arg(short, long, default_value = "figure.png")]
        output: PathBuf,
    },

    /// Query a running figgen service for a task's status
    Status {
        /// Task identifier
        task_id: String,

        /// Base URL of the running service
        #[arg(short, long, default_value = "http://127.0.0.1:9000")]
        server: String,
    },

    /// List the reference catalog
    Catalog,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum KindArg {
    Methodology,
    Plot,
}

impl From<KindArg> for DiagramKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Methodology => Self::MethodologyDiagram,
            KindArg::Plot => Self::StatisticalPlot,
        }
    }
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let settings = Settings::load(self.config.as_deref())?;

        match self.command {
            Commands::Serve { address } => {
                let scheduler = build_scheduler(&settings).await?;
                let addr = address.unwrap_or_else(|| settings.bind_addr.clone());
                api::serve(&addr, ApiState { scheduler }).await
            }

            Commands::Generate {
                input,
                intent,
                kind,
                data,
                rounds,
                output,
            } => {
                let source_text = read_source(input)?;
                let raw_data = match data {
                    Some(path) => {
                        let content = std::fs::read_to_string(&path).with_context(|| {
                            format!("Failed to read data file: {}", path.display())
                        })?;
                        Some(serde_json::from_str(&content).context("Data file is not valid JSON")?)
                    }
                    None => None,
                };

                let request = GenerationRequest {
                    source_text,
                    intent,
                    kind: kind.into(),
                    raw_data,
                    max_rounds: rounds,
                };

                let scheduler = build_scheduler(&settings).await?;
                let task_id = scheduler.submit(request).await?;
                println!("Submitted task {task_id}");

                let bytes = poll_until_done(&scheduler, task_id).await?;
                tokio::fs::write(&output, bytes)
                    .await
                    .with_context(|| format!("Failed to write image: {}", output.display()))?;
                println!("Wrote {}", output.display());
                Ok(())
            }

            Commands::Status { task_id, server } => {
                let id = Uuid::parse_str(&task_id)
                    .with_context(|| format!("Invalid task id: {task_id}"))?;
                let url = format!("{}/api/v1/tasks/{id}", server.trim_end_matches('/'));

                let response = reqwest::get(&url)
                    .await
                    .with_context(|| format!("Status request failed: {url}"))?;
                if response.status() == reqwest::StatusCode::NOT_FOUND {
                    bail!("task {id} not found");
                }
                let snapshot: serde_json::Value = response
                    .error_for_status()
                    .context("Status request rejected")?
                    .json()
                    .await
                    .context("Malformed status response")?;

                println!("{}", serde_json::to_string_pretty(&snapshot)?);
                Ok(())
            }

            Commands::Catalog => {
                let catalog = ReferenceCatalog::load(&settings.reference_path).await?;
                if catalog.is_empty() {
                    println!("Reference catalog is empty");
                    return Ok(());
                }
                for example in catalog.examples() {
                    let excerpt: String = example.description.chars().take(60).collect();
                    println!("{:<24} {:<12?} {}", example.id, example.category, excerpt);
                }
                Ok(())
            }
        }
    }
}

/// Wire up the provider stack, catalog, and scheduler from settings
async fn build_scheduler(settings: &Settings) -> Result<Arc<Scheduler>> {
    let api_key = std::env::var(&settings.provider.api_key_env).with_context(|| {
        format!(
            "Provider API key not set (expected in ${})",
            settings.provider.api_key_env
        )
    })?;

    let gemini = GeminiProvider::new(
        settings.provider.base_url.clone(),
        api_key,
        settings.provider.text_model.clone(),
        settings.provider.image_model.clone(),
    );
    let provider: Arc<dyn Provider> = Arc::new(RetryProvider::new(
        Arc::new(gemini),
        settings.retry.policy(),
        settings.provider.call_timeout(),
    ));

    let catalog = Arc::new(ReferenceCatalog::load(&settings.reference_path).await?);
    let store: Arc<dyn ArtifactStore> = Arc::new(FsStore::new(&settings.output_dir));

    let retriever = Retriever::new(catalog, Arc::clone(&provider), settings.retrieval_examples);
    let orchestrator = Arc::new(Orchestrator::new(
        provider,
        retriever,
        Arc::clone(&store),
        settings.max_rounds,
    ));

    Ok(Scheduler::new(orchestrator, store, settings.workers))
}

fn read_source(input: Option<PathBuf>) -> Result<String> {
    match input {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read input file: {}", path.display())),
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read from stdin")?;
            Ok(buffer)
        }
    }
}

/// Poll the scheduler until the task is terminal; return the artifact bytes
async fn poll_until_done(scheduler: &Scheduler, task_id: Uuid) -> Result<Vec<u8>> {
    loop {
        tokio::time::sleep(POLL_INTERVAL).await;
        let task = scheduler.status(task_id).await?;

        match task.status {
            TaskStatus::Completed => {
                let result = task.result().context("completed task has no result")?;
                println!(
                    "Completed after {} round(s): {}",
                    result.rounds,
                    result.description.chars().take(120).collect::<String>()
                );
                return Ok(scheduler.fetch_artifact(task_id).await?);
            }
            TaskStatus::Failed => {
                bail!(
                    "generation failed: {}",
                    task.error().unwrap_or("unknown error")
                );
            }
            TaskStatus::Pending | TaskStatus::Running => {}
        }
    }
}
