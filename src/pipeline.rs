//! Pipeline orchestration
//!
//! Stage order:
//! 1. Load occurrences and the checklist
//! 2. Count by scope and classify each species
//! 3. Join native status
//! 4. Bin by week and summarize phenology
//! 5. Optionally resolve common names
//! 6. Plan pages and render every document
//!
//! `analyze` and `plan_report` are pure; only `run` touches the filesystem or
//! the network.

use crate::abundance::{classify, count_by_scope, Classification};
use crate::config::PipelineConfig;
use crate::data::{load_checklist, load_occurrences, LoadReport, UNKNOWN_FAMILY};
use crate::model::{Occurrence, Species, SpeciesRecord};
use crate::names::{resolve_common_names, GbifNameClient, NameCache, NameReport};
use crate::native::{join_native, Checklist, JoinReport};
use crate::pagination::{
    plan_abundance_table, plan_genus_pages, plan_rare_table, plan_ridge_pages, ReportPages,
};
use crate::phenology::{build_weekly_bins, earliest_flowering, summarize};
use crate::report::{write_report, write_run_summary, OutputFormat};
use anyhow::{Context, Result};
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Species records plus the run accounting
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    /// Classified species ordered by (family, genus, name)
    pub records: Vec<SpeciesRecord>,
    pub summary: RunSummary,
}

/// Page count per document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PageCounts {
    pub bar_charts: usize,
    pub ridge_plots: usize,
    pub rare_table: usize,
    pub abundance_table: usize,
}

/// Everything skipped, defaulted or flagged during a run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load: Option<LoadReport>,
    pub species_observed: usize,
    pub species_classified: usize,
    pub by_category: BTreeMap<String, usize>,
    pub by_quality_tier: BTreeMap<String, usize>,
    /// No observations in either scope
    pub unclassified: Vec<String>,
    /// Classified but without flowering records
    pub no_phenology: Vec<String>,
    /// Flowering at both ends of the year
    pub year_boundary: Vec<String>,
    pub native_join: JoinReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub common_names: Option<NameReport>,
    pub pages: PageCounts,
}

impl Analysis {
    /// Attach resolved common names to the species records
    pub fn with_common_names(mut self, names: &FxHashMap<String, String>) -> Self {
        for record in &mut self.records {
            record.species.common_name = names.get(record.name()).cloned();
        }
        self
    }

    /// Scientific names of every classified species, in record order
    pub fn species_names(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.name())
    }
}

/// Input and output locations for one run
#[derive(Debug, Clone)]
pub struct RunPaths {
    pub occurrences: PathBuf,
    pub checklist: PathBuf,
    pub output_dir: PathBuf,
    pub format: OutputFormat,
}

/// Per-species family: first value that is not the placeholder, in input order
fn families(occurrences: &[Occurrence]) -> FxHashMap<&str, &str> {
    let mut families: FxHashMap<&str, &str> = FxHashMap::default();
    for occ in occurrences {
        let entry = families.entry(occ.species.as_str()).or_insert(UNKNOWN_FAMILY);
        if *entry == UNKNOWN_FAMILY && occ.family != UNKNOWN_FAMILY {
            *entry = occ.family.as_str();
        }
    }
    families
}

/// Classify, join and summarize every species
pub fn analyze(occurrences: &[Occurrence], checklist: &Checklist, config: &PipelineConfig) -> Analysis {
    let counts = count_by_scope(occurrences, &config.regions);
    let bins = build_weekly_bins(occurrences);
    let families = families(occurrences);

    let mut by_species: FxHashMap<&str, Vec<&Occurrence>> = FxHashMap::default();
    for occ in occurrences {
        by_species.entry(occ.species.as_str()).or_default().push(occ);
    }

    let mut names: Vec<&str> = by_species.keys().copied().collect();
    names.sort_unstable();

    let mut summary = RunSummary {
        species_observed: names.len(),
        ..Default::default()
    };

    let mut classified = Vec::with_capacity(names.len());
    for &name in &names {
        let scope = counts.get(name).copied().unwrap_or_default();
        match classify(scope.narrow, scope.broad, &config.thresholds) {
            Classification::Classified(category) => classified.push((name, category, scope)),
            Classification::Unclassified => {
                tracing::warn!("Unclassified species (no observations in either scope): {}", name);
                summary.unclassified.push(name.to_string());
            }
        }
    }

    let (native, join_report) = join_native(classified.iter().map(|(name, _, _)| *name), checklist);
    if !join_report.unmatched.is_empty() {
        tracing::warn!(
            "{} species not on the checklist, treated as non-native",
            join_report.unmatched_count()
        );
        for name in &join_report.unmatched {
            tracing::debug!("Checklist miss: {}", name);
        }
    }
    summary.native_join = join_report;

    let mut records = Vec::with_capacity(classified.len());
    for (name, category, scope) in classified {
        let observations = by_species.get(name).map(Vec::as_slice).unwrap_or(&[]);
        let species_bins = bins.get(name).cloned().unwrap_or_default();

        let narrow_flowering = observations
            .iter()
            .filter(|o| o.flowering && config.regions.is_narrow(&o.region))
            .count() as u32;
        let phenology = summarize(
            &species_bins,
            earliest_flowering(observations.iter().copied()),
            narrow_flowering,
            &config.window,
            &config.quality,
        );

        match &phenology {
            None => {
                tracing::info!("No phenology data for {}", name);
                summary.no_phenology.push(name.to_string());
            }
            Some(p) => {
                *summary.by_quality_tier.entry(p.tier.as_str().to_string()).or_default() += 1;
                if p.spans_year_boundary {
                    tracing::warn!(
                        "{} flowers at both ends of the year; window {:.1}-{:.1} is on a linear axis",
                        name,
                        p.window_start_week,
                        p.window_end_week
                    );
                    summary.year_boundary.push(name.to_string());
                }
            }
        }
        *summary.by_category.entry(category.as_str().to_string()).or_default() += 1;

        records.push(SpeciesRecord {
            species: Species {
                scientific_name: name.to_string(),
                family: families.get(name).copied().unwrap_or(UNKNOWN_FAMILY).to_string(),
                genus: crate::taxonomy::genus_of(name).to_string(),
                native: native.get(name).copied().unwrap_or(false),
                common_name: None,
            },
            category,
            counts: scope,
            total_obs: observations.len() as u32,
            bins: species_bins,
            phenology,
        });
    }

    records.sort_by(|a, b| {
        a.species
            .family
            .cmp(&b.species.family)
            .then_with(|| a.species.genus.cmp(&b.species.genus))
            .then_with(|| a.name().cmp(b.name()))
    });
    summary.species_classified = records.len();

    tracing::info!(
        observed = summary.species_observed,
        classified = summary.species_classified,
        unclassified = summary.unclassified.len(),
        no_phenology = summary.no_phenology.len(),
        "Analysis complete"
    );

    Analysis { records, summary }
}

/// Run all four page policies
pub fn plan_report(analysis: &Analysis, config: &PipelineConfig) -> ReportPages {
    let sizes = &config.page_sizes;
    ReportPages {
        bar_charts: plan_genus_pages(&analysis.records, sizes.bar_chart),
        ridge_plots: plan_ridge_pages(&analysis.records, sizes.ridge),
        rare_table: plan_rare_table(&analysis.records, sizes.rare_table),
        abundance_table: plan_abundance_table(&analysis.records, sizes.abundance_table),
    }
}

fn page_counts(pages: &ReportPages) -> PageCounts {
    PageCounts {
        bar_charts: pages.bar_charts.len().max(1),
        ridge_plots: pages.ridge_plots.len().max(1),
        rare_table: pages.rare_table.len().max(1),
        abundance_table: pages.abundance_table.len().max(1),
    }
}

/// Common names for every analyzed species, cache first
fn lookup_common_names(analysis: &Analysis, config: &PipelineConfig) -> Result<(FxHashMap<String, String>, NameReport)> {
    let name_config = &config.common_names;
    let mut cache = match &name_config.cache_path {
        Some(path) => NameCache::open(path)?,
        None => NameCache::in_memory(),
    };
    let client = GbifNameClient::new(name_config).context("Failed to build GBIF client")?;

    Ok(resolve_common_names(
        analysis.species_names(),
        &mut cache,
        &client,
        name_config,
    ))
}

/// Species the loader removed entirely by region count as unclassified
fn record_outside_region_species(summary: &mut RunSummary, load: &LoadReport) {
    for name in &load.outside_region_species {
        tracing::warn!("Unclassified species (no observations in either scope): {}", name);
        summary.unclassified.push(name.clone());
    }
    summary.species_observed += load.outside_region_species.len();
    summary.unclassified.sort();
    summary.unclassified.dedup();
}

/// Load, analyze, plan and write every output
pub fn run(paths: &RunPaths, config: &PipelineConfig) -> Result<RunSummary> {
    config.validate().context("Invalid configuration")?;

    let table = load_occurrences(&paths.occurrences, config)?;
    let checklist = load_checklist(&paths.checklist, &config.checklist)?;

    let mut analysis = analyze(&table.occurrences, &checklist, config);
    record_outside_region_species(&mut analysis.summary, &table.report);
    analysis.summary.load = Some(table.report);

    if config.common_names.enabled {
        match lookup_common_names(&analysis, config) {
            Ok((names, report)) => {
                analysis = analysis.with_common_names(&names);
                analysis.summary.common_names = Some(report);
            }
            Err(e) => tracing::warn!("Common names unavailable: {:#}", e),
        }
    }

    let pages = plan_report(&analysis, config);
    analysis.summary.pages = page_counts(&pages);

    write_report(&pages, paths.format, &paths.output_dir)?;
    write_run_summary(&analysis.summary, &paths.output_dir)?;

    Ok(analysis.summary)
}
