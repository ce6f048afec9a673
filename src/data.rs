//! Data Loading
//!
//! Reads the occurrence table and the native checklist with Polars, then
//! converts rows into typed `Occurrence` records. Malformed rows are counted
//! and skipped; only a missing file or missing required column is an error.
//!
//! Accepted formats: Darwin Core `occurrence.txt` (tab separated, unquoted),
//! `.tsv`, `.csv` and `.parquet`.

use crate::config::{ChecklistColumns, PipelineConfig};
use crate::model::Occurrence;
use crate::native::Checklist;
use crate::phenology::is_flowering;
use crate::taxonomy::{genus_of, species_name};
use crate::utils::{
    date_from_parts, materialize_as_strings, optional_str, parse_event_date, require_columns,
    required_str,
};
use anyhow::{Context, Result};
use polars::prelude::*;
use rustc_hash::FxHashSet;
use serde::Serialize;
use std::path::Path;

/// Family recorded for rows without one
pub const UNKNOWN_FAMILY: &str = "Unknown family";

/// Row accounting for the occurrence load
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub rows_read: usize,
    pub missing_taxon: usize,
    pub above_species_rank: usize,
    pub unparseable_date: usize,
    pub outside_date_range: usize,
    pub outside_regions: usize,
    pub retained: usize,
    /// Species whose every dated row fell outside both region scopes, sorted
    pub outside_region_species: Vec<String>,
}

impl LoadReport {
    pub fn dropped(&self) -> usize {
        self.rows_read - self.retained
    }
}

/// Loaded occurrences with their row accounting
#[derive(Debug, Clone)]
pub struct OccurrenceTable {
    pub occurrences: Vec<Occurrence>,
    pub report: LoadReport,
}

/// Read a CSV/TSV/Parquet table with every column as string
pub fn read_table(path: &Path) -> Result<DataFrame> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "parquet" => {
            let lazy = LazyFrame::scan_parquet(path, Default::default())
                .with_context(|| format!("Failed to scan parquet: {:?}", path))?;
            materialize_as_strings(lazy, &format!("{:?}", path))
        }
        "csv" => read_delimited(path, b',', Some(b'"')),
        // Darwin Core text files: tab separated, quotes are literal characters
        _ => read_delimited(path, b'\t', None),
    }
}

fn read_delimited(path: &Path, separator: u8, quote: Option<u8>) -> Result<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .map_parse_options(|opts| {
            opts.with_separator(separator)
                .with_quote_char(quote)
                .with_truncate_ragged_lines(true)
        })
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .with_context(|| format!("Failed to create CSV reader: {:?}", path))?
        .finish()
        .with_context(|| format!("Failed to load table: {:?}", path))
}

/// Load and filter occurrences from a file
pub fn load_occurrences(path: &Path, config: &PipelineConfig) -> Result<OccurrenceTable> {
    let df = read_table(path)?;
    let table = occurrences_from_frame(&df, config)
        .with_context(|| format!("Failed to read occurrences from {:?}", path))?;

    tracing::info!(
        rows = table.report.rows_read,
        retained = table.report.retained,
        "Loaded occurrences from {:?}",
        path
    );
    Ok(table)
}

/// Convert an occurrence DataFrame into typed, filtered records
///
/// Drop order: missing taxon, above species rank, unparseable date, outside
/// date range, outside regions. Each row is counted under the first reason
/// that applies.
pub fn occurrences_from_frame(df: &DataFrame, config: &PipelineConfig) -> Result<OccurrenceTable> {
    let cols = &config.columns;
    require_columns(
        df,
        &[
            cols.scientific_name.as_str(),
            cols.event_date.as_str(),
            cols.region.as_str(),
            cols.annotation.as_str(),
        ],
        "occurrences",
    )?;

    let scientific = required_str(df, &cols.scientific_name, "occurrences")?;
    let event_date = required_str(df, &cols.event_date, "occurrences")?;
    let region = required_str(df, &cols.region, "occurrences")?;
    let annotation = required_str(df, &cols.annotation, "occurrences")?;
    let species_col = optional_str(df, &cols.species);
    let family_col = optional_str(df, &cols.family);
    let record_col = optional_str(df, &cols.record_id);
    let year_col = optional_str(df, &cols.year);
    let month_col = optional_str(df, &cols.month);
    let day_col = optional_str(df, &cols.day);

    let get = |column: Option<&StringChunked>, idx: usize| -> Option<String> {
        column
            .and_then(|c| c.get(idx))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let mut report = LoadReport {
        rows_read: df.height(),
        ..Default::default()
    };
    let mut occurrences = Vec::with_capacity(df.height());
    let mut retained_species: FxHashSet<String> = FxHashSet::default();
    let mut outside_species: FxHashSet<String> = FxHashSet::default();

    for idx in 0..df.height() {
        let raw_name = get(Some(scientific), idx);
        let raw_species = get(species_col, idx);
        if raw_name.is_none() && raw_species.is_none() {
            report.missing_taxon += 1;
            continue;
        }

        let Some(species) = species_name(raw_name.as_deref(), raw_species.as_deref()) else {
            report.above_species_rank += 1;
            continue;
        };

        let date = event_date
            .get(idx)
            .and_then(parse_event_date)
            .or_else(|| {
                date_from_parts(
                    year_col.and_then(|c| c.get(idx)),
                    month_col.and_then(|c| c.get(idx)),
                    day_col.and_then(|c| c.get(idx)),
                )
            });
        let Some(date) = date else {
            report.unparseable_date += 1;
            continue;
        };

        if !config.date_range.contains(date) {
            report.outside_date_range += 1;
            continue;
        }

        let region_code = region.get(idx).map(str::trim).unwrap_or("");
        if !config.regions.is_retained(region_code) {
            report.outside_regions += 1;
            outside_species.insert(species);
            continue;
        }

        let record_id = get(record_col, idx)
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(idx as u64);

        retained_species.insert(species.clone());
        occurrences.push(Occurrence {
            record_id,
            genus: genus_of(&species).to_string(),
            family: get(family_col, idx).unwrap_or_else(|| UNKNOWN_FAMILY.to_string()),
            species,
            date,
            region: region_code.to_string(),
            flowering: is_flowering(annotation.get(idx), &config.flowering),
        });
    }

    report.retained = occurrences.len();
    report.outside_region_species = outside_species
        .into_iter()
        .filter(|s| !retained_species.contains(s))
        .collect();
    report.outside_region_species.sort();
    if report.dropped() > 0 {
        tracing::warn!(
            missing_taxon = report.missing_taxon,
            above_species_rank = report.above_species_rank,
            unparseable_date = report.unparseable_date,
            outside_date_range = report.outside_date_range,
            outside_regions = report.outside_regions,
            "Skipped {} of {} occurrence rows",
            report.dropped(),
            report.rows_read
        );
    }

    Ok(OccurrenceTable { occurrences, report })
}

/// Load the native checklist from a file
pub fn load_checklist(path: &Path, columns: &ChecklistColumns) -> Result<Checklist> {
    let df = read_table(path)?;
    let checklist = checklist_from_frame(&df, columns)
        .with_context(|| format!("Failed to read checklist from {:?}", path))?;

    tracing::info!("Loaded checklist: {} species from {:?}", checklist.len(), path);
    Ok(checklist)
}

/// Build a checklist from a (name, status) DataFrame
pub fn checklist_from_frame(df: &DataFrame, columns: &ChecklistColumns) -> Result<Checklist> {
    require_columns(df, &[columns.name.as_str(), columns.status.as_str()], "checklist")?;
    let names = required_str(df, &columns.name, "checklist")?;
    let status = required_str(df, &columns.status, "checklist")?;

    let rows = (0..df.height()).filter_map(|idx| names.get(idx).map(|name| (name, status.get(idx))));

    Ok(Checklist::from_rows(rows, &columns.native_code))
}
