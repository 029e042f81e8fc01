//! Librarian
//!
//! Serves file-tree index queries for one repository over stdio.

use anyhow::{Context, Result};
use clap::Parser;
use librarian_core::{find_repo_root, IndexManager, LibrarianConfig};
use librarian_server::{JsonLineServer, ToolHandler};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "librarian")]
#[command(about = "Librarian - file-tree index for AI coding assistants")]
#[command(version)]
struct Cli {
    /// Repository root (default: nearest ancestor containing .git)
    #[arg(long)]
    root: Option<PathBuf>,

    /// Config file (default: <root>/.claude/librarian.yaml, then user config)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Skip loading the index at startup
    #[arg(long)]
    no_preload: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let cwd = std::env::current_dir().context("Failed to read working directory")?;
    let detected_root = cli.root.clone().unwrap_or_else(|| find_repo_root(&cwd));

    let config = match &cli.config {
        Some(path) => LibrarianConfig::load_from(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => LibrarianConfig::load(&detected_root),
    };

    // Logs go to stderr; stdout carries protocol frames
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = match (&cli.root, &config.repository_root) {
        (None, Some(configured)) => configured.clone(),
        _ => detected_root,
    };
    let root = root
        .canonicalize()
        .with_context(|| format!("Repository root not found: {}", root.display()))?;

    tracing::info!(root = ?root, "Starting Librarian v{}", env!("CARGO_PKG_VERSION"));

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(root, config, !cli.no_preload))
}

async fn run(root: PathBuf, config: LibrarianConfig, preload: bool) -> Result<()> {
    let manager = Arc::new(IndexManager::new(root, config));

    if preload {
        // A failed preload is retried on the first request
        if let Err(e) = manager.index().await {
            tracing::warn!(error = %e, "Failed to preload index");
        }
    }

    let handler = Arc::new(ToolHandler::new(manager));
    JsonLineServer::new(handler)
        .run()
        .await
        .context("Server stopped")?;

    Ok(())
}
