//! Report rendering and output files
//!
//! The planner's pages are rendered as Markdown and/or JSON documents. Chart
//! rasterization is left to downstream tools; these documents carry every
//! resolved value they need.

pub mod json;
pub mod markdown;

pub use json::JsonFormatter;
pub use markdown::MarkdownFormatter;

use crate::pagination::ReportPages;
use crate::pipeline::RunSummary;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Text of the single page rendered for an empty document
pub const EMPTY_PAGE_TEXT: &str = "No species";

pub const RUN_SUMMARY_FILE: &str = "run_summary.json";

/// The four report products
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Document {
    BarCharts,
    RidgePlots,
    RareTable,
    AbundanceTable,
}

impl Document {
    pub const ALL: [Document; 4] = [
        Document::BarCharts,
        Document::RidgePlots,
        Document::RareTable,
        Document::AbundanceTable,
    ];

    pub fn file_stem(&self) -> &'static str {
        match self {
            Document::BarCharts => "family_bar_charts",
            Document::RidgePlots => "ridge_plots",
            Document::RareTable => "rare_species_table",
            Document::AbundanceTable => "abundance_summary_table",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Document::BarCharts => "Weekly flowering observations by genus",
            Document::RidgePlots => "Flowering phenology of native species",
            Document::RareTable => "Flowering phenology of rare species",
            Document::AbundanceTable => "Abundance summary",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Markdown,
    Json,
    Both,
}

impl OutputFormat {
    fn markdown(&self) -> bool {
        matches!(self, OutputFormat::Markdown | OutputFormat::Both)
    }

    fn json(&self) -> bool {
        matches!(self, OutputFormat::Json | OutputFormat::Both)
    }
}

/// Render one document in Markdown
pub fn render_markdown(document: Document, pages: &ReportPages) -> String {
    match document {
        Document::BarCharts => MarkdownFormatter::bar_charts(&pages.bar_charts),
        Document::RidgePlots => MarkdownFormatter::ridge_plots(&pages.ridge_plots),
        Document::RareTable => MarkdownFormatter::rare_table(&pages.rare_table),
        Document::AbundanceTable => MarkdownFormatter::abundance_table(&pages.abundance_table),
    }
}

/// Render one document as pretty-printed JSON
pub fn render_json(document: Document, pages: &ReportPages) -> Result<String, serde_json::Error> {
    let title = document.title();
    match document {
        Document::BarCharts => JsonFormatter::format(title, &pages.bar_charts),
        Document::RidgePlots => JsonFormatter::format(title, &pages.ridge_plots),
        Document::RareTable => JsonFormatter::format(title, &pages.rare_table),
        Document::AbundanceTable => JsonFormatter::format(title, &pages.abundance_table),
    }
}

/// Write every document in the requested format(s); returns the written paths
pub fn write_report(pages: &ReportPages, format: OutputFormat, output_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", output_dir))?;

    let mut written = Vec::new();
    for document in Document::ALL {
        if format.markdown() {
            let path = output_dir.join(format!("{}.md", document.file_stem()));
            write_file(&path, &render_markdown(document, pages))?;
            written.push(path);
        }
        if format.json() {
            let path = output_dir.join(format!("{}.json", document.file_stem()));
            let body = render_json(document, pages)
                .with_context(|| format!("Failed to serialize {}", document.file_stem()))?;
            write_file(&path, &body)?;
            written.push(path);
        }
    }

    Ok(written)
}

/// Write `run_summary.json`
pub fn write_run_summary(summary: &RunSummary, output_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", output_dir))?;

    let path = output_dir.join(RUN_SUMMARY_FILE);
    let body = serde_json::to_string_pretty(summary).context("Failed to serialize run summary")?;
    write_file(&path, &body)?;
    Ok(path)
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("Failed to write {:?}", path))?;
    tracing::info!("Wrote {:?}", path);
    Ok(())
}
