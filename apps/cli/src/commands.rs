//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use url::Url;

use papergraph_core::generation::{EchoGenerator, Generator};
use papergraph_core::pipeline::{self, IngestConfig};
use papergraph_core::retriever::{Retriever, build_prompt, render_context};
use papergraph_core::source::LocalSource;
use papergraph_embeddings::{Embedder, HashEmbedder, HttpEmbedder};
use papergraph_graph::{GraphStore, LocalGraph};
use papergraph_shared::{
    AppConfig, PaperId, Thresholds, init_config, load_config, resolve_path, validate_config,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// PaperGraph — a semantic graph over scientific papers.
#[derive(Parser)]
#[command(
    name = "papergraph",
    version,
    about = "Ingest arXiv LaTeX sources into a typed paper graph and query it.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Ingest paper source bundles and compute pairwise relations.
    Ingest {
        /// Paper ids to ingest (e.g. 2108.07258).
        #[arg(required = true)]
        paper_ids: Vec<String>,

        /// Directory containing the source bundles (one subdirectory per id).
        #[arg(long)]
        source_root: Option<String>,

        /// Path to the graph database file.
        #[arg(long)]
        db: Option<String>,
    },

    /// Answer a question from the paper graph.
    Query {
        /// The natural-language question.
        text: String,

        /// Number of anchor papers to retrieve.
        #[arg(short)]
        k: Option<usize>,

        /// Path to the graph database file.
        #[arg(long)]
        db: Option<String>,
    },

    /// List the papers stored in the graph.
    List {
        /// Path to the graph database file.
        #[arg(long)]
        db: Option<String>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "papergraph=info",
        1 => "papergraph=debug",
        _ => "papergraph=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Ingest {
            paper_ids,
            source_root,
            db,
        } => cmd_ingest(&paper_ids, source_root.as_deref(), db.as_deref()).await,
        Command::Query { text, k, db } => cmd_query(&text, k, db.as_deref()).await,
        Command::List { db } => cmd_list(db.as_deref()).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// Shared setup
// ---------------------------------------------------------------------------

/// Resolve the database path from the flag or config.
fn db_path(config: &AppConfig, flag: Option<&str>) -> Result<PathBuf> {
    let raw = flag.unwrap_or(&config.defaults.db_path);
    Ok(resolve_path(raw)?)
}

/// Build the configured embedding collaborator.
///
/// Env access for the API key happens here, at the outermost boundary.
fn build_embedder(config: &AppConfig) -> Result<Arc<dyn Embedder>> {
    match config.embedding.provider.as_str() {
        "hash" => Ok(Arc::new(HashEmbedder::new(config.embedding.dimension))),
        "http" => {
            let endpoint = Url::parse(&config.embedding.endpoint)
                .map_err(|e| eyre!("invalid embedding endpoint: {e}"))?;
            let mut embedder = HttpEmbedder::new(
                endpoint,
                config.embedding.model.clone(),
                config.embedding.dimension,
            )?;
            if let Ok(token) = std::env::var(&config.embedding.api_key_env) {
                if !token.is_empty() {
                    embedder = embedder.with_bearer_token(token);
                }
            }
            Ok(Arc::new(embedder))
        }
        other => Err(eyre!("unknown embedding provider '{other}'")),
    }
}

/// Spinner used for long-running commands.
fn spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_ingest(
    paper_ids: &[String],
    source_root: Option<&str>,
    db: Option<&str>,
) -> Result<()> {
    let config = load_config()?;
    validate_config(&config)?;

    let source_root = source_root
        .map(String::from)
        .unwrap_or_else(|| config.defaults.source_root.clone());
    let db = db_path(&config, db)?;

    info!(
        papers = paper_ids.len(),
        source_root = %source_root,
        "ingesting paper sources"
    );

    let store = Arc::new(LocalGraph::open(&db, config.embedding.dimension).await?);
    let embedder = build_embedder(&config)?;
    let fetcher = Arc::new(LocalSource::new(resolve_path(&source_root)?));

    let ingest_config = IngestConfig {
        paper_ids: paper_ids.iter().map(|id| PaperId::new(id.clone())).collect(),
        thresholds: Thresholds::from(&config.thresholds),
        concurrency: config.defaults.concurrency,
    };

    let progress = spinner();
    progress.set_message(format!("Ingesting {} papers", paper_ids.len()));

    let report = pipeline::ingest(
        &ingest_config,
        fetcher,
        embedder,
        store as Arc<dyn GraphStore>,
    )
    .await?;

    progress.finish_and_clear();

    // One line per recovered fault, then the summary.
    for warning in &report.warnings {
        println!("  warning: {warning}");
    }
    for (id, reason) in &report.skipped {
        println!("  skipped {id}: {reason}");
    }

    println!();
    println!("  Ingest complete");
    println!("  Papers:    {}", report.nodes.len());
    println!("  Skipped:   {}", report.skipped.len());
    println!("  Relations: {}", report.relations_written);
    println!("  Database:  {}", db.display());
    println!("  Time:      {:.1}s", report.elapsed.as_secs_f64());
    println!();

    Ok(())
}

async fn cmd_query(text: &str, k: Option<usize>, db: Option<&str>) -> Result<()> {
    let config = load_config()?;
    validate_config(&config)?;

    let db = db_path(&config, db)?;
    let k = k.unwrap_or(config.defaults.top_k);

    let store = Arc::new(LocalGraph::open(&db, config.embedding.dimension).await?);
    let embedder = build_embedder(&config)?;
    let retriever = Retriever::new(store as Arc<dyn GraphStore>, embedder);

    let context = retriever.retrieve(text, k).await?;

    if context.is_empty() {
        println!("No relevant papers found.");
        return Ok(());
    }

    println!("{}", render_context(&context));

    let prompt = build_prompt(text, &context);
    let answer = EchoGenerator.generate(&prompt).await?;
    println!("--- Prompt for the generation model ---");
    println!("{answer}");

    Ok(())
}

async fn cmd_list(db: Option<&str>) -> Result<()> {
    let config = load_config()?;
    let db = db_path(&config, db)?;

    let store = LocalGraph::open(&db, config.embedding.dimension).await?;
    let papers = store.list_papers().await?;
    let relations = store.count_relations().await?;

    if papers.is_empty() {
        println!("No papers stored yet. Run `papergraph ingest` first.");
        return Ok(());
    }

    for (id, title, year) in &papers {
        if *year > 0 {
            println!("  {id}  {title} ({year})");
        } else {
            println!("  {id}  {title}");
        }
    }
    println!();
    println!("  {} papers, {} relations", papers.len(), relations);

    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config = load_config()?;
    let rendered = toml::to_string_pretty(&config)?;
    println!("{rendered}");
    Ok(())
}
