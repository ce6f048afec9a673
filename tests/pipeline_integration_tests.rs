//! Pipeline Integration Tests
//!
//! Runs the whole pipeline against small Darwin Core style files written to a
//! temporary directory and checks the rendered documents and run summary.

use phenology_report::report::{render_markdown, Document};
use phenology_report::{analyze, plan_report, run, OutputFormat, PipelineConfig, RunPaths};
use std::fs;
use std::path::{Path, PathBuf};

const HEADER: &str = "gbifID\tscientificName\tfamily\teventDate\tstateProvince\treproductiveCondition";

/// (scientific name, family, date, region, annotation) rows as occurrence.txt
fn write_occurrences(dir: &Path, rows: &[(&str, &str, String, &str, &str)]) -> PathBuf {
    let mut body = String::from(HEADER);
    body.push('\n');
    for (idx, (name, family, date, region, annotation)) in rows.iter().enumerate() {
        body.push_str(&format!(
            "{}\t{}\t{}\t{}\t{}\t{}\n",
            1000 + idx,
            name,
            family,
            date,
            region,
            annotation
        ));
    }

    let path = dir.join("occurrence.txt");
    fs::write(&path, body).unwrap();
    path
}

fn write_checklist(dir: &Path) -> PathBuf {
    let path = dir.join("checklist.csv");
    fs::write(
        &path,
        "scientific_name,status\n\
         Viola sororia,N\n\
         Carex rara,N\n\
         Acer rubrum var. trilobum,N\n\
         Rosa multiflora,I\n",
    )
    .unwrap();
    path
}

fn sample_rows() -> Vec<(&'static str, &'static str, String, &'static str, &'static str)> {
    let mut rows = Vec::new();

    // 11 flowering records in the focal region: ct_uncommon, native
    for day in 0..11 {
        rows.push((
            "Viola sororia Willd.",
            "Violaceae",
            format!("2021-04-{:02}", 20 + day % 10),
            "Connecticut",
            "flowering",
        ));
    }
    // 3 flowering records: ct_rare, native
    for day in 0..3 {
        rows.push(("Carex rara Boott", "Cyperaceae", format!("2019-05-{:02}", 10 + day), "Connecticut", "flowers"));
    }
    // 40 records, none flowering: ct_uncommon without phenology
    for day in 0..40 {
        rows.push(("Acer rubrum L.", "Sapindaceae", format!("2020-02-{:02}", 1 + day % 28), "Connecticut", ""));
    }
    // 12 records outside the focal region only: ne_only, non-native
    for day in 0..12 {
        rows.push((
            "Rosa multiflora Thunb.",
            "Rosaceae",
            format!("2022-06-{:02}", 1 + day),
            "Maine",
            "no flowers",
        ));
    }
    // Dropped: genus only, bad date, outside every region
    rows.push(("Carex", "Cyperaceae", "2021-05-01".to_string(), "Connecticut", "flowering"));
    rows.push(("Viola sororia", "Violaceae", "spring 2021".to_string(), "Connecticut", "flowering"));
    rows.push(("Viola sororia", "Violaceae", "2021-05-01".to_string(), "Ontario", "flowering"));

    rows
}

fn paths(input: &Path, output: &Path, format: OutputFormat) -> RunPaths {
    RunPaths {
        occurrences: write_occurrences(input, &sample_rows()),
        checklist: write_checklist(input),
        output_dir: output.to_path_buf(),
        format,
    }
}

#[test]
fn test_end_to_end_run() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("reports");
    let summary = run(&paths(dir.path(), &output, OutputFormat::Both), &PipelineConfig::default()).unwrap();

    let load = summary.load.as_ref().unwrap();
    assert_eq!(load.rows_read, 69);
    assert_eq!(load.retained, 66);
    assert_eq!(load.above_species_rank, 1);
    assert_eq!(load.unparseable_date, 1);
    assert_eq!(load.outside_regions, 1);

    assert_eq!(summary.species_classified, 4);
    assert_eq!(summary.by_category["ct_uncommon"], 2);
    assert_eq!(summary.by_category["ct_rare"], 1);
    assert_eq!(summary.by_category["ne_only"], 1);
    assert_eq!(
        summary.no_phenology,
        vec!["Acer rubrum".to_string(), "Rosa multiflora".to_string()]
    );
    assert!(summary.native_join.unmatched.is_empty());

    for stem in ["family_bar_charts", "ridge_plots", "rare_species_table", "abundance_summary_table"] {
        assert!(output.join(format!("{}.md", stem)).exists(), "{} missing", stem);
        assert!(output.join(format!("{}.json", stem)).exists(), "{} missing", stem);
    }

    let read = |name: &str| fs::read_to_string(output.join(name)).unwrap();

    // Species without flowering data stay in the count-based outputs only
    let bars = read("family_bar_charts.md");
    let ridges = read("ridge_plots.md");
    let rare = read("rare_species_table.md");
    let abundance = read("abundance_summary_table.md");

    assert!(bars.contains("#### Acer rubrum"));
    assert!(abundance.contains("| Acer rubrum |"));
    assert!(!ridges.contains("Acer rubrum"));
    assert!(!rare.contains("Acer rubrum"));

    // Ridge plots carry native species with phenology only
    assert!(ridges.contains("Viola sororia"));
    assert!(ridges.contains("Carex rara"));
    assert!(!ridges.contains("Rosa multiflora"));

    // Rare table carries ct_rare species only
    assert!(rare.contains("Carex rara"));
    assert!(!rare.contains("Viola sororia"));
    assert!(rare.contains("2019-05-10"));

    let run_summary: serde_json::Value = serde_json::from_str(&read("run_summary.json")).unwrap();
    assert_eq!(run_summary["species_classified"], 4);
    assert_eq!(run_summary["pages"]["ridge_plots"], 1);
}

#[test]
fn test_rerun_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first");
    let second = dir.path().join("second");

    run(&paths(dir.path(), &first, OutputFormat::Both), &PipelineConfig::default()).unwrap();
    run(&paths(dir.path(), &second, OutputFormat::Both), &PipelineConfig::default()).unwrap();

    for entry in fs::read_dir(&first).unwrap() {
        let entry = entry.unwrap();
        let a = fs::read(entry.path()).unwrap();
        let b = fs::read(second.join(entry.file_name())).unwrap();
        assert_eq!(a, b, "{:?} differs between runs", entry.file_name());
    }
}

#[test]
fn test_no_retained_species_renders_empty_documents() {
    let dir = tempfile::tempdir().unwrap();
    let rows = vec![("Viola sororia", "Violaceae", "2021-05-01".to_string(), "Ontario", "flowering")];
    let paths = RunPaths {
        occurrences: write_occurrences(dir.path(), &rows),
        checklist: write_checklist(dir.path()),
        output_dir: dir.path().join("reports"),
        format: OutputFormat::Markdown,
    };

    let summary = run(&paths, &PipelineConfig::default()).unwrap();
    assert_eq!(summary.species_classified, 0);
    assert_eq!(summary.pages.bar_charts, 1);

    for stem in ["family_bar_charts", "ridge_plots", "rare_species_table", "abundance_summary_table"] {
        let md = fs::read_to_string(paths.output_dir.join(format!("{}.md", stem))).unwrap();
        assert!(md.contains("## Page 1 of 1"));
        assert!(md.contains("No species"));
    }
    assert!(!paths.output_dir.join("ridge_plots.json").exists());
}

#[test]
fn test_page_sizes_come_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let occurrences = write_occurrences(dir.path(), &sample_rows());
    let checklist = write_checklist(dir.path());

    let mut config = PipelineConfig::default();
    config.page_sizes.abundance_table = 1;
    config.page_sizes.ridge = 1;

    let table = phenology_report::data::load_occurrences(&occurrences, &config).unwrap();
    let checklist = phenology_report::data::load_checklist(&checklist, &config.checklist).unwrap();
    let analysis = analyze(&table.occurrences, &checklist, &config);
    let pages = plan_report(&analysis, &config);

    assert_eq!(pages.abundance_table.len(), 4);
    assert_eq!(pages.ridge_plots.len(), 2);
    // Earlier peak ranks first: Viola (late April) before Carex (mid May)
    assert_eq!(pages.ridge_plots[0].entries[0].record.name(), "Viola sororia");

    let md = render_markdown(Document::AbundanceTable, &pages);
    assert!(md.contains("## Page 4 of 4"));
}

#[test]
fn test_species_only_outside_regions_is_unclassified() {
    let dir = tempfile::tempdir().unwrap();
    let rows = vec![
        ("Viola sororia", "Violaceae", "2021-05-01".to_string(), "Connecticut", "flowering"),
        ("Viola lanceolata", "Violaceae", "2021-05-02".to_string(), "Ontario", "flowering"),
    ];
    let paths = RunPaths {
        occurrences: write_occurrences(dir.path(), &rows),
        checklist: write_checklist(dir.path()),
        output_dir: dir.path().join("reports"),
        format: OutputFormat::Json,
    };

    let summary = run(&paths, &PipelineConfig::default()).unwrap();
    assert_eq!(summary.unclassified, vec!["Viola lanceolata".to_string()]);
    assert_eq!(summary.species_observed, 2);
    assert_eq!(summary.species_classified, 1);

    let run_summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(paths.output_dir.join("run_summary.json")).unwrap()).unwrap();
    assert_eq!(run_summary["unclassified"][0], "Viola lanceolata");
    let abundance = fs::read_to_string(paths.output_dir.join("abundance_summary_table.json")).unwrap();
    assert!(!abundance.contains("Viola lanceolata"));
}
