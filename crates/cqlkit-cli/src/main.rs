//! cqlkit command-line entry point

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::Parser;
use cqlkit_cli::{CliConfig, render, run_query};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Run a CQL query against a JSON content fixture
#[derive(Debug, Parser)]
#[command(name = "cqlkit", version, about)]
struct Args {
    /// CQL query, e.g. "type='page' AND created > now('-4w')"
    query: String,

    /// JSON content fixture (overrides the config file)
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Evaluate now() at this RFC 3339 instant
    #[arg(long)]
    now: Option<DateTime<Utc>>,

    /// Log level when RUST_LOG is not set
    #[arg(long)]
    log_level: Option<String>,

    /// Pretty-print results
    #[arg(short, long)]
    pretty: bool,
}

fn load_config(args: &Args) -> anyhow::Result<CliConfig> {
    let mut config = match &args.config {
        Some(path) => CliConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => CliConfig::default(),
    };
    if let Some(data) = &args.data {
        config = config.data_file(data);
    }
    if let Some(now) = args.now {
        config = config.reference_time(now);
    }
    if let Some(level) = &args.log_level {
        config = config.log_level(level);
    }
    if args.pretty {
        config = config.pretty(true);
    }
    Ok(config)
}

fn main() {
    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e:#}");
            std::process::exit(2);
        }
    };

    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    let output = run_query(&config, &args.query)
        .and_then(|results| render(&results, config.pretty));

    match output {
        Ok(json) => println!("{json}"),
        Err(e) => {
            error!("Query failed: {}", e);
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
