//! Command line front-end: scores a JSONL file of predictions against a JSONL file of gold
//! annotations and prints the result as text, JSON or a comma-separated table.

use anyhow::{Context, Result};
use clap::Parser;
use nereval::{evaluate_from_files, EvalConfigBuilder, DEFAULT_ENTITY_FIELD};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Evaluate NER predictions against gold annotations
#[derive(Debug, Parser)]
#[command(name = "nereval")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Gold JSONL file
    #[arg(short, long)]
    gold: PathBuf,

    /// Predictions JSONL file, aligned line by line with the gold file
    #[arg(short, long)]
    pred: PathBuf,

    /// Show per-type metrics
    #[arg(long)]
    per_type: bool,

    /// Output as JSON
    #[arg(long, conflicts_with = "csv")]
    json: bool,

    /// Output as a comma-separated table, including the weighted average
    #[arg(long)]
    csv: bool,

    /// Entity types to report on, comma separated. Discovered from the files when omitted
    #[arg(short, long, value_delimiter = ',')]
    types: Option<Vec<String>>,

    /// Key holding the entity list in every line
    #[arg(long, default_value = DEFAULT_ENTITY_FIELD)]
    field: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut builder = EvalConfigBuilder::default()
        .entity_field(args.field)
        .include_per_type(args.per_type);
    if let Some(types) = args.types {
        builder = builder.known_types(types);
    }
    let config = builder.build();
    tracing::debug!(%config, "configuration");

    let result = evaluate_from_files(&args.gold, &args.pred, &config).with_context(|| {
        format!(
            "Failed to evaluate {} against {}",
            args.pred.display(),
            args.gold.display()
        )
    })?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result.to_report())?);
    } else if args.csv {
        print!("{}", result.classification_table());
    } else {
        println!("{}", result.summary(config.include_per_type()));
    }
    Ok(())
}
