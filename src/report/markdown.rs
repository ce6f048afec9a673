use super::{Document, EMPTY_PAGE_TEXT};
use crate::model::{AbundanceCategory, PhenologyEntry, PhenologySummary, SpeciesRecord, WEEKS_PER_YEAR};
use crate::pagination::{GroupHeader, Page};
use crate::phenology::week_label;

/// Widest text bar, in characters
const BAR_WIDTH: u32 = 30;

/// Density levels for ridge strips, lowest to highest
const RIDGE_LEVELS: [char; 9] = [' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Markdown formatter for report documents
pub struct MarkdownFormatter;

impl MarkdownFormatter {
    /// Genus-faceted weekly flowering bars
    pub fn bar_charts(pages: &[Page<SpeciesRecord>]) -> String {
        let document = Document::BarCharts;
        if pages.is_empty() {
            return Self::empty_document(document);
        }

        let mut md = String::with_capacity(4096);
        md.push_str(&format!("# {}\n\n", document.title()));

        for page in pages {
            Self::page_heading(&mut md, page.number, pages.len());
            md.push_str(&format!(
                "*Layout: {} × {}*\n\n",
                page.layout.rows, page.layout.columns
            ));

            for group in &page.groups {
                Self::group_heading(&mut md, group);
                for record in &page.entries[group.start..group.start + group.len] {
                    Self::format_bar_chart(&mut md, record);
                }
            }
        }

        md
    }

    fn format_bar_chart(md: &mut String, record: &SpeciesRecord) {
        md.push_str(&format!("#### {}\n\n", record.species.display_name()));
        md.push_str(&format!(
            "{} · {} observations · {}\n\n",
            record.category.label(),
            record.total_obs,
            native_label(record.species.native)
        ));

        let weekly = record.flowering_by_week();
        let max = weekly.iter().copied().max().unwrap_or(0);
        if max == 0 {
            md.push_str("_No flowering records_\n\n");
            return;
        }

        md.push_str("```text\n");
        for (idx, &count) in weekly.iter().enumerate() {
            if count == 0 {
                continue;
            }
            let width = (count * BAR_WIDTH).div_ceil(max).max(1);
            md.push_str(&format!(
                "wk {:>2} {:<6} | {} {}\n",
                idx + 1,
                week_label(idx as f64 + 1.0),
                "█".repeat(width as usize),
                count
            ));
        }
        md.push_str("```\n\n");
    }

    /// Ridge rows: one 52-cell density strip per species, in peak-week rank
    pub fn ridge_plots(pages: &[Page<PhenologyEntry>]) -> String {
        let document = Document::RidgePlots;
        if pages.is_empty() {
            return Self::empty_document(document);
        }

        let mut md = String::with_capacity(4096);
        md.push_str(&format!("# {}\n\n", document.title()));

        let mut rank = 0;
        for page in pages {
            Self::page_heading(&mut md, page.number, pages.len());
            md.push_str("| Rank | Species | Peak | Window | Jan → Dec |\n");
            md.push_str("|-----:|---------|------|--------|-----------|\n");

            for entry in &page.entries {
                rank += 1;
                md.push_str(&format!(
                    "| {} | {} | {} | {} | `{}` |\n",
                    rank,
                    entry.record.species.display_name(),
                    format_peak(&entry.summary),
                    format_window(&entry.summary),
                    ridge_strip(&entry.record)
                ));
            }
            md.push('\n');
        }

        md
    }

    /// Rare species table, ordered by peak week
    pub fn rare_table(pages: &[Page<PhenologyEntry>]) -> String {
        let document = Document::RareTable;
        if pages.is_empty() {
            return Self::empty_document(document);
        }

        let mut md = String::with_capacity(4096);
        md.push_str(&format!("# {}\n\n", document.title()));

        for page in pages {
            Self::page_heading(&mut md, page.number, pages.len());
            md.push_str("| Species | Family | Peak | Window | Earliest flowering | Flowering obs | Region obs | Data |\n");
            md.push_str("|---------|--------|------|--------|--------------------|--------------:|-----------:|------|\n");

            for entry in &page.entries {
                let summary = &entry.summary;
                md.push_str(&format!(
                    "| {} | {} | {} | {} | {} | {} | {} | {} |\n",
                    entry.record.species.display_name(),
                    entry.record.species.family,
                    format_peak(summary),
                    format_window(summary),
                    summary.earliest_date.format("%Y-%m-%d"),
                    summary.total_flowering_obs,
                    summary.narrow_region_obs,
                    summary.tier.as_str()
                ));
            }
            md.push('\n');
        }

        md
    }

    /// Every classified species, grouped by abundance category
    pub fn abundance_table(pages: &[Page<SpeciesRecord>]) -> String {
        let document = Document::AbundanceTable;
        if pages.is_empty() {
            return Self::empty_document(document);
        }

        let mut md = String::with_capacity(4096);
        md.push_str(&format!("# {}\n\n", document.title()));

        for page in pages {
            Self::page_heading(&mut md, page.number, pages.len());

            for group in &page.groups {
                Self::group_heading(&mut md, group);
                md.push_str("| Species | Family | Status | Region obs | Wider obs | Peak |\n");
                md.push_str("|---------|--------|--------|-----------:|----------:|------|\n");

                for record in &page.entries[group.start..group.start + group.len] {
                    let peak = record
                        .phenology
                        .as_ref()
                        .map(format_peak)
                        .unwrap_or_else(|| "-".to_string());
                    md.push_str(&format!(
                        "| {} | {} | {} | {} | {} | {} |\n",
                        record.species.display_name(),
                        record.species.family,
                        native_label(record.species.native),
                        record.counts.narrow,
                        record.counts.broad,
                        peak
                    ));
                }
                md.push('\n');
            }
        }

        md
    }

    fn empty_document(document: Document) -> String {
        let mut md = format!("# {}\n\n", document.title());
        Self::page_heading(&mut md, 1, 1);
        md.push_str(EMPTY_PAGE_TEXT);
        md.push('\n');
        md
    }

    fn page_heading(md: &mut String, number: usize, total: usize) {
        md.push_str(&format!("## Page {} of {}\n\n", number, total));
    }

    fn group_heading(md: &mut String, group: &GroupHeader) {
        let label = AbundanceCategory::ALL
            .iter()
            .find(|c| c.as_str() == group.label)
            .map(|c| c.label())
            .unwrap_or(group.label.as_str());
        let suffix = if group.continued { " (continued)" } else { "" };
        md.push_str(&format!("### {}{}\n\n", label, suffix));
    }
}

fn native_label(native: bool) -> &'static str {
    if native {
        "native"
    } else {
        "non-native"
    }
}

fn format_peak(summary: &PhenologySummary) -> String {
    format!("wk {:.1} ({})", summary.peak_week, week_label(summary.peak_week))
}

fn format_window(summary: &PhenologySummary) -> String {
    let mut window = format!(
        "{} – {}",
        week_label(summary.window_start_week),
        week_label(summary.window_end_week)
    );
    if summary.spans_year_boundary {
        window.push_str(" ⚠ spans year end");
    }
    window
}

/// 52 characters, each week scaled against the species' busiest week
fn ridge_strip(record: &SpeciesRecord) -> String {
    let weekly = record.flowering_by_week();
    let max = weekly.iter().copied().max().unwrap_or(0);
    let top = (RIDGE_LEVELS.len() - 1) as u32;

    let mut strip = String::with_capacity(WEEKS_PER_YEAR as usize * 3);
    for count in weekly {
        let level = if max == 0 || count == 0 {
            0
        } else {
            (count * top).div_ceil(max).clamp(1, top)
        };
        strip.push(RIDGE_LEVELS[level as usize]);
    }
    strip
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DataQualityTier, ScopeCounts, Species, WeeklyBin};
    use crate::pagination::{plan_abundance_table, plan_genus_pages, plan_rare_table, plan_ridge_pages};
    use chrono::NaiveDate;

    fn record(name: &str, category: AbundanceCategory, flowering: &[(u8, u32)]) -> SpeciesRecord {
        let bins: Vec<WeeklyBin> = flowering
            .iter()
            .map(|&(week, count)| WeeklyBin { week, flowering: count, total: count.max(1) })
            .collect();
        let total: u32 = flowering.iter().map(|(_, c)| c).sum();
        let phenology = (total > 0).then(|| PhenologySummary {
            peak_week: 20.0,
            window_start_week: 18.0,
            window_end_week: 22.0,
            earliest_date: NaiveDate::from_ymd_opt(2019, 5, 2).unwrap(),
            earliest_record_id: 7,
            total_flowering_obs: total,
            narrow_region_obs: total,
            tier: DataQualityTier::Light,
            spans_year_boundary: false,
        });

        SpeciesRecord {
            species: Species {
                scientific_name: name.to_string(),
                family: "Violaceae".to_string(),
                genus: name.split(' ').next().unwrap().to_string(),
                native: true,
                common_name: Some("common blue violet".to_string()),
            },
            category,
            counts: ScopeCounts { narrow: 4, broad: 9 },
            total_obs: 40,
            bins,
            phenology,
        }
    }

    #[test]
    fn test_empty_documents_render_one_page() {
        for md in [
            MarkdownFormatter::bar_charts(&[]),
            MarkdownFormatter::ridge_plots(&[]),
            MarkdownFormatter::rare_table(&[]),
            MarkdownFormatter::abundance_table(&[]),
        ] {
            assert!(md.contains("## Page 1 of 1"));
            assert!(md.contains("No species"));
        }
    }

    #[test]
    fn test_bar_chart_scales_to_busiest_week() {
        let records = vec![record("Viola sororia", AbundanceCategory::CtRare, &[(18, 2), (19, 4)])];
        let md = MarkdownFormatter::bar_charts(&plan_genus_pages(&records, 9));

        assert!(md.contains("### Viola (Violaceae)"));
        assert!(md.contains("#### Viola sororia (common blue violet)"));
        assert!(md.contains(&format!("{} 4\n", "█".repeat(30))));
        assert!(md.contains(&format!("{} 2\n", "█".repeat(15))));
    }

    #[test]
    fn test_bar_chart_without_flowering() {
        let records = vec![record("Viola pallens", AbundanceCategory::CtCommon, &[])];
        let md = MarkdownFormatter::bar_charts(&plan_genus_pages(&records, 9));
        assert!(md.contains("_No flowering records_"));
        assert!(md.contains("40 observations"));
    }

    #[test]
    fn test_ridge_strip_has_52_cells() {
        let rec = record("Viola sororia", AbundanceCategory::CtRare, &[(1, 1), (26, 8), (52, 4)]);
        let strip = ridge_strip(&rec);
        let cells: Vec<char> = strip.chars().collect();

        assert_eq!(cells.len(), 52);
        assert_eq!(cells[25], '█');
        assert_eq!(cells[51], '▄');
        assert_eq!(cells[0], '▁');
        assert_eq!(cells[10], ' ');
    }

    #[test]
    fn test_ridge_ranks_continue_across_pages() {
        let records = vec![
            record("Viola a", AbundanceCategory::CtCommon, &[(10, 1)]),
            record("Viola b", AbundanceCategory::CtCommon, &[(11, 1)]),
            record("Viola c", AbundanceCategory::CtCommon, &[(12, 1)]),
        ];
        let md = MarkdownFormatter::ridge_plots(&plan_ridge_pages(&records, 2));
        assert!(md.contains("## Page 2 of 2"));
        assert!(md.contains("| 3 | Viola c"));
    }

    #[test]
    fn test_rare_table_rows() {
        let records = vec![record("Viola rara", AbundanceCategory::CtRare, &[(20, 6)])];
        let md = MarkdownFormatter::rare_table(&plan_rare_table(&records, 40));
        assert!(md.contains("| Viola rara (common blue violet) | Violaceae |"));
        assert!(md.contains("2019-05-02"));
        assert!(md.contains("| light |"));
    }

    #[test]
    fn test_abundance_table_group_labels() {
        let records = vec![
            record("Viola a", AbundanceCategory::CtCommon, &[]),
            record("Viola b", AbundanceCategory::NeRare, &[]),
        ];
        let md = MarkdownFormatter::abundance_table(&plan_abundance_table(&records, 40));
        assert!(md.contains("### Common in region"));
        assert!(md.contains("### Rare outside region only"));
        assert!(md.contains("| Viola a (common blue violet) | Violaceae | native | 4 | 9 | - |"));
    }
}
