//! `rpl-lsp` - RPL language server over stdio

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use rpl_completion::{ConfigLoader, RplConfig};
use rpl_lsp::LspServer;
use tracing::{error, info};

/// Language server providing completion and formatting for RPL patterns
#[derive(Debug, Parser)]
#[command(name = "rpl-lsp", version, about)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Enable debug mode for verbose logging
    #[arg(long)]
    debug: bool,

    /// Configuration file (YAML or JSON)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Project root searched for `.rpl/config.{yaml,yml,json}`
    #[arg(long, value_name = "DIR")]
    project_root: Option<PathBuf>,
}

impl Args {
    fn log_level(&self) -> String {
        self.log_level.clone().unwrap_or_else(|| {
            if self.debug {
                "debug".to_string()
            } else {
                "info".to_string()
            }
        })
    }
}

/// Initialize logging on stderr; stdout carries the protocol
fn init_logging(args: &Args) {
    use tracing_subscriber::fmt;

    let level = match args.log_level().to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    };

    fmt()
        .with_max_level(level)
        .with_target(args.debug)
        .with_thread_ids(args.debug)
        .with_file(args.debug)
        .with_line_number(args.debug)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &Args) -> anyhow::Result<RplConfig> {
    if let Some(path) = &args.config {
        return ConfigLoader::load_from_path(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()));
    }

    let root = match &args.project_root {
        Some(root) => root.clone(),
        None => std::env::current_dir().context("failed to determine current directory")?,
    };

    ConfigLoader::load_with_hierarchy(&root)
        .with_context(|| format!("failed to load project configuration under {}", root.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args);

    info!("Starting RPL language server");
    info!("Log level: {}", args.log_level());

    let config = load_config(&args)?;
    info!(
        vocabulary_mode = ?config.completion.vocabulary_mode,
        formatter = ?config.formatter.mode,
        "Configuration loaded"
    );

    let mut server = LspServer::with_config(&config);

    if let Err(e) = server.run_stdio().await {
        error!("RPL language server error: {}", e);
        return Err(e.into());
    }

    if !server.shutdown_requested() {
        // LSP: exit without a preceding shutdown terminates with code 1
        std::process::exit(1);
    }

    info!("RPL language server shut down gracefully");
    Ok(())
}
