use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use url::Url;

use docflow_config::WorkflowDef;
use docflow_docstore::{DocumentStore, HttpDocumentStore, MemoryDocumentStore};
use docflow_engine::{ChannelNotifier, Engine, EngineConfig};
use docflow_gateway::{AppState, GatewayConfig, GatewayServer};
use docflow_store::SqliteStore;
use docflow_workflow::Workflow;

/// Docflow - a document workflow engine
#[derive(Parser)]
#[command(name = "docflow")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the data directory (default: ~/.docflow)
  #[arg(long, global = true)]
  data_dir: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Serve the workflow gateway API
  Serve {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1:3000")]
    bind: String,

    /// Base URL of an external document store, e.g.
    /// http://localhost:4000/api/documents/ (default: built-in in-memory store)
    #[arg(long)]
    document_store: Option<String>,
  },

  /// Run a workflow file and print status events as NDJSON
  Run {
    /// Path to the workflow file (JSON)
    workflow_file: PathBuf,

    /// Node ids to start from (default: nodes with no incoming edges)
    #[arg(long = "start")]
    start: Vec<String>,

    /// Base URL of an external document store (default: in-memory store)
    #[arg(long)]
    document_store: Option<String>,
  },
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();

  let data_dir = cli.data_dir.unwrap_or_else(|| {
    dirs::home_dir()
      .unwrap_or_else(|| PathBuf::from("."))
      .join(".docflow")
  });

  match cli.command {
    Some(Commands::Serve {
      bind,
      document_store,
    }) => {
      serve(bind, document_store, data_dir)?;
    }
    Some(Commands::Run {
      workflow_file,
      start,
      document_store,
    }) => {
      run_workflow(workflow_file, start, document_store)?;
    }
    None => {
      println!("docflow - use --help to see available commands");
    }
  }

  Ok(())
}

fn serve(bind: String, document_store: Option<String>, data_dir: PathBuf) -> Result<()> {
  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(async { serve_async(bind, document_store, data_dir).await })
}

async fn serve_async(
  bind: String,
  document_store: Option<String>,
  data_dir: PathBuf,
) -> Result<()> {
  std::fs::create_dir_all(&data_dir)
    .with_context(|| format!("failed to create data directory: {}", data_dir.display()))?;

  let db_path = data_dir.join("docflow.db");
  let options = SqliteConnectOptions::new()
    .filename(&db_path)
    .create_if_missing(true);
  let pool = SqlitePoolOptions::new()
    .connect_with(options)
    .await
    .with_context(|| format!("failed to open database: {}", db_path.display()))?;

  let workflows = SqliteStore::new(pool);
  workflows
    .migrate()
    .await
    .context("failed to run database migrations")?;

  let state = Arc::new(AppState {
    documents: select_document_store(document_store)?,
    workflows: Arc::new(workflows),
    engine: EngineConfig::default(),
  });

  let cancel = CancellationToken::new();
  let shutdown = cancel.clone();
  tokio::spawn(async move {
    if tokio::signal::ctrl_c().await.is_ok() {
      shutdown.cancel();
    }
  });

  let server = GatewayServer::new(GatewayConfig { bind }, state);
  server.run(cancel).await.context("gateway server failed")?;

  Ok(())
}

fn run_workflow(
  workflow_file: PathBuf,
  start: Vec<String>,
  document_store: Option<String>,
) -> Result<()> {
  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(async { run_workflow_async(workflow_file, start, document_store).await })
}

async fn run_workflow_async(
  workflow_file: PathBuf,
  start: Vec<String>,
  document_store: Option<String>,
) -> Result<()> {
  let raw = tokio::fs::read_to_string(&workflow_file)
    .await
    .with_context(|| format!("failed to read workflow file: {}", workflow_file.display()))?;
  let def: WorkflowDef = serde_json::from_str(&raw)
    .with_context(|| format!("failed to parse workflow file: {}", workflow_file.display()))?;

  let workflow = Workflow::validate(def).context("invalid workflow graph")?;
  eprintln!("Loaded workflow with {} nodes", workflow.nodes.len());

  let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
  let printer = tokio::spawn(async move {
    while let Some(event) = rx.recv().await {
      match serde_json::to_string(&event) {
        Ok(line) => println!("{line}"),
        Err(e) => eprintln!("failed to encode event: {e}"),
      }
    }
  });

  let engine = Engine::with_notifier(
    select_document_store(document_store)?,
    EngineConfig::default(),
    ChannelNotifier::new(tx),
  );

  let summary = engine
    .execute(&workflow, &start, CancellationToken::new())
    .await
    .context("workflow execution failed")?;
  drop(engine);
  printer.await.ok();

  let failed = summary
    .nodes
    .values()
    .filter(|outcome| outcome.status == docflow_config::NodeStatus::Error)
    .count();
  eprintln!(
    "Run {} completed: {} nodes executed, {} failed",
    summary.run_id,
    summary.nodes.len(),
    failed
  );

  Ok(())
}

fn select_document_store(document_store: Option<String>) -> Result<Arc<dyn DocumentStore>> {
  match document_store {
    Some(base) => {
      let base_url =
        Url::parse(&base).with_context(|| format!("invalid document store url: {base}"))?;
      Ok(Arc::new(HttpDocumentStore::new(base_url)))
    }
    None => Ok(Arc::new(MemoryDocumentStore::new())),
  }
}
