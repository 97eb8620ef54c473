use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::sync::Mutex;
use tower_lsp::{LspService, Server};
use tracing::info;

use treelight_language_server::highlight::HighlightContext;
use treelight_language_server::logging;
use treelight_language_server::lsp::backend::Backend;
use treelight_language_server::tree_cache::TreeCache;

/// Language server providing tree-sitter based semantic highlighting over
/// stdio.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Log level for stderr output (otherwise RUST_LOG or "info")
    #[arg(long)]
    log_level: Option<String>,

    /// Disable ANSI colors in stderr output
    #[arg(long)]
    no_color: bool,

    /// Disable the per-session debug log file
    #[arg(long)]
    no_file_log: bool,

    /// Path to a highlight query overriding the built-in one
    #[arg(long)]
    query: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let _guard = logging::init_logger(args.no_color, args.log_level.as_deref(), !args.no_file_log)
        .context("failed to initialize logging")?;

    let query_source = match &args.query {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read highlight query {}", path.display()))?,
        None => tree_sitter_rust::HIGHLIGHTS_QUERY.to_string(),
    };

    let context = Arc::new(
        HighlightContext::new(tree_sitter_rust::LANGUAGE.into(), &query_source)
            .context("failed to compile highlight query")?,
    );
    let trees = Arc::new(Mutex::new(
        TreeCache::new(context.language()).context("failed to configure parser")?,
    ));

    info!(
        "Starting treelight language server with {} token types",
        context.legend().token_types.len()
    );

    let (service, socket) = LspService::new(|client| Backend::new(client, context, trees));

    Server::new(tokio::io::stdin(), tokio::io::stdout(), socket)
        .serve(service)
        .await;

    Ok(())
}
