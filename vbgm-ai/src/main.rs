//! vbgm-ai - Music segment extraction CLI
//!
//! Reads a model response from a file or stdin, runs the segment pipeline and
//! prints the `ParseResult` as JSON on stdout. Logs go to stderr.
//!
//! Exits non-zero only for I/O or configuration problems; every parse
//! outcome (including the emergency fallback) is a success.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use vbgm_ai::SegmentPipeline;
use vbgm_common::config::{resolve_max_segments, TomlConfig};

/// Command-line arguments for vbgm-ai
#[derive(Parser, Debug)]
#[command(name = "vbgm-ai")]
#[command(about = "Extract background-music segments from model output")]
#[command(version)]
struct Args {
    /// Model response file (reads stdin when omitted or "-")
    input: Option<PathBuf>,

    /// Maximum number of segments to return (overrides VBGM_MAX_SEGMENTS)
    #[arg(short, long)]
    max_segments: Option<usize>,

    /// Config file (overrides VBGM_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(short, long)]
    pretty: bool,

    /// Log level filter, e.g. "debug" or "vbgm_ai=trace" (overrides RUST_LOG)
    #[arg(short, long)]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Config is loaded before the real subscriber exists; surface its
    // warnings (missing file) through a temporary stderr logger
    let bootstrap = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("warn"))
        .with_writer(std::io::stderr)
        .finish();
    let config = tracing::subscriber::with_default(bootstrap, || {
        TomlConfig::load(args.config.as_deref())
    })
    .context("Failed to load configuration")?;

    init_tracing(args.log_level.as_deref(), &config.logging.level)?;
    info!("Starting vbgm-ai v{}", env!("CARGO_PKG_VERSION"));

    let max_segments = resolve_max_segments(args.max_segments, &config)
        .context("Invalid max_segments")?;
    let pipeline = SegmentPipeline::from_config(&config)
        .context("Failed to load lexicon/template overrides")?;

    let text = read_input(args.input.as_deref())?;
    debug!(bytes = text.len(), max_segments, "Read model response");

    let result = pipeline.parse(&text, max_segments);
    info!(
        strategy = %result.strategy,
        segments = result.segments.len(),
        "Parse complete"
    );

    let json = if args.pretty {
        serde_json::to_string_pretty(&result)
    } else {
        serde_json::to_string(&result)
    }
    .context("Failed to serialize result")?;
    println!("{}", json);

    Ok(())
}

/// Filter priority: `--log-level` → `RUST_LOG` → config file level
fn init_tracing(cli_level: Option<&str>, config_level: &str) -> Result<()> {
    let filter = match cli_level {
        Some(level) => EnvFilter::try_new(level)
            .with_context(|| format!("Invalid log level '{}'", level))?,
        None => EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(config_level))
            .with_context(|| format!("Invalid configured log level '{}'", config_level))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            Ok(text)
        }
    }
}
