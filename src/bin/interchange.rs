//! Interchange CLI: run one read or write against a chain described in YAML.
//!
//! Usage:
//!   interchange --config chain.yaml read <id> [--dump]
//!   interchange --config chain.yaml write <json> [--mode series|parallel] [--dump]

use clap::{Parser, Subcommand};
use interchange::{ChainConfig, MemorySource, WriteMode};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "interchange",
    version,
    about = "Read and write through a chain of data sources"
)]
struct Cli {
    /// Path to the YAML chain definition
    #[arg(long, short)]
    config: PathBuf,
    /// Print every source's entries after the operation
    #[arg(long, global = true)]
    dump: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read a value by id
    Read {
        /// Id to look up (parsed as JSON, falling back to a plain string)
        id: String,
    },
    /// Write a JSON value to every source
    Write {
        /// JSON value to write
        value: String,
        /// Override the write mode from the config file
        #[arg(long)]
        mode: Option<WriteMode>,
    },
}

/// Parse an argument as JSON; anything that isn't JSON is a string.
fn parse_arg(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(_) => println!("{}", value),
    }
}

fn dump(config: &ChainConfig, stores: &[Arc<MemorySource>]) {
    for (source, store) in config.sources.iter().zip(stores) {
        let entries: serde_json::Map<String, Value> = store.snapshot().into_iter().collect();
        eprintln!("--- {} ({} entries)", source.name, entries.len());
        print_json(&Value::Object(entries));
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    let mut config = ChainConfig::load(&cli.config).map_err(|e| e.to_string())?;
    if let Commands::Write { mode: Some(mode), .. } = &cli.command {
        config.write_mode = *mode;
    }
    let (adapter, stores) = config.build().map_err(|e| e.to_string())?;

    match &cli.command {
        Commands::Read { id } => {
            match adapter.read(&parse_arg(id)).await.map_err(|e| e.to_string())? {
                Some(value) => print_json(&value),
                None => eprintln!("not found: {}", id),
            }
        }
        Commands::Write { value, .. } => {
            let written = adapter
                .write(parse_arg(value))
                .await
                .map_err(|e| e.to_string())?;
            print_json(&written);
        }
    }

    if cli.dump {
        dump(&config, &stores);
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
