//! Phenology report binary entry point
//!
//! Usage:
//! ```bash
//! phenology-report --occurrences occurrence.txt --checklist checklist.csv \
//!     --output-dir reports [--config run.json] [--common-names] [--format both]
//! ```

use anyhow::Context;
use clap::Parser;
use phenology_report::{run, OutputFormat, PipelineConfig, RunPaths};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Flowering phenology reports from occurrence records
#[derive(Parser, Debug)]
#[command(name = "phenology-report", version)]
struct Args {
    /// Occurrence table (Darwin Core occurrence.txt, .tsv, .csv or .parquet)
    #[arg(long, value_name = "FILE")]
    occurrences: PathBuf,

    /// Native-status checklist
    #[arg(long, value_name = "FILE")]
    checklist: PathBuf,

    /// Directory for the rendered documents and run summary
    #[arg(long, value_name = "DIR", default_value = "reports")]
    output_dir: PathBuf,

    /// JSON run configuration; defaults apply to every omitted field
    #[arg(long, value_name = "FILE", env = "PHENOLOGY_CONFIG")]
    config: Option<PathBuf>,

    /// Look up common names from GBIF
    #[arg(long)]
    common_names: bool,

    /// Common-name cache (JSON Lines)
    #[arg(long, value_name = "FILE")]
    name_cache: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Markdown)]
    format: OutputFormat,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "phenology_report=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };
    if args.common_names {
        config.common_names.enabled = true;
    }
    if let Some(path) = args.name_cache {
        config.common_names.cache_path = Some(path);
    }

    let paths = RunPaths {
        occurrences: args.occurrences,
        checklist: args.checklist,
        output_dir: args.output_dir,
        format: args.format,
    };

    tracing::info!("Occurrences: {:?}", paths.occurrences);
    tracing::info!("Checklist:   {:?}", paths.checklist);
    tracing::info!("Output:      {:?}", paths.output_dir);

    let summary = run(&paths, &config).context("Report run failed")?;

    tracing::info!(
        "Done: {} species classified, {} without phenology, {} unclassified",
        summary.species_classified,
        summary.no_phenology.len(),
        summary.unclassified.len()
    );
    Ok(())
}
