use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use openapi_complexity::{analyze_with_weights, Document, JsonReport, ScoreWeights};

#[derive(Parser)]
#[command(name = "openapi-complexity")]
#[command(about = "Compute structural complexity metrics for an OpenAPI contract")]
struct Cli {
    /// Path to the OpenAPI document (YAML or JSON)
    document: PathBuf,

    /// Write the JSON report here instead of stdout
    #[arg(long)]
    json_out: Option<PathBuf>,

    /// Write the narrative assessment document here
    #[arg(long)]
    report_out: Option<PathBuf>,

    /// TOML file overriding scorer weights
    #[arg(long)]
    weights: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let value = parse_document(&cli.document)
        .with_context(|| format!("failed to read {}", cli.document.display()))?;
    let document = Document::from_value(&value)?;

    for warning in &document.warnings {
        eprintln!("warning: {}", warning);
    }

    let weights = match &cli.weights {
        Some(path) => ScoreWeights::from_path(path)
            .with_context(|| format!("failed to load weights from {}", path.display()))?,
        None => ScoreWeights::default(),
    };

    let (snapshot, score) = analyze_with_weights(&document, &weights)?;
    let report = openapi_complexity::render(&snapshot, &score);
    let json = serde_json::to_string_pretty(&JsonReport::new(&snapshot, &score))?;

    match &cli.json_out {
        Some(path) => {
            fs::write(path, &json)?;
            println!("{}", report.summary);
            println!("Wrote complexity report to {}", path.display());
        }
        None => println!("{}", json),
    }

    if let Some(path) = &cli.report_out {
        fs::write(path, &report.assessment)?;
        println!("Wrote assessment to {}", path.display());
    }

    Ok(())
}

/// Parse YAML or JSON by extension into a generic value tree
fn parse_document(path: &Path) -> anyhow::Result<serde_json::Value> {
    let content = fs::read_to_string(path)?;
    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"))
        .unwrap_or(false);

    let value = if is_yaml {
        serde_yaml::from_str(&content)?
    } else {
        serde_json::from_str(&content)?
    };
    Ok(value)
}
