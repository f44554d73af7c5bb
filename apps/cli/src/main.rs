//! PaperGraph CLI — paper ingestion and graph-grounded retrieval.
//!
//! Ingests arXiv LaTeX bundles into a typed paper graph and answers
//! natural-language queries with graph-grounded context.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
