//! Page planning for the four report products
//!
//! Each policy is a pure function of the species records and a page size.
//! Ordering is fully determined by the sort keys, so identical input always
//! gives identical pages.

use crate::data::UNKNOWN_FAMILY;
use crate::model::{AbundanceCategory, PhenologyEntry, SpeciesRecord};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Ordering rule a page was built with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    FamilyGenusSpecies,
    PeakWeek,
    CategoryFamilySpecies,
}

/// Grid the renderer should lay a page out on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LayoutHint {
    pub rows: usize,
    pub columns: usize,
    pub sort_key: SortKey,
}

/// A labelled run of entries on one page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupHeader {
    pub label: String,
    /// Index of the first entry in the group
    pub start: usize,
    pub len: usize,
    /// The group began on an earlier page
    pub continued: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    /// 1-based
    pub number: usize,
    pub entries: Vec<T>,
    pub groups: Vec<GroupHeader>,
    pub layout: LayoutHint,
}

/// Pages for all four outputs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportPages {
    pub bar_charts: Vec<Page<SpeciesRecord>>,
    pub ridge_plots: Vec<Page<PhenologyEntry>>,
    pub rare_table: Vec<Page<PhenologyEntry>>,
    pub abundance_table: Vec<Page<SpeciesRecord>>,
}

/// Grid with `columns` columns large enough for `per_page` entries
fn grid(per_page: usize, columns: usize, sort_key: SortKey) -> LayoutHint {
    let columns = columns.clamp(1, per_page.max(1));
    LayoutHint {
        rows: per_page.max(1).div_ceil(columns),
        columns,
        sort_key,
    }
}

/// Square-ish grid for faceted charts (9 → 3 × 3)
fn facet_grid(per_page: usize) -> LayoutHint {
    let columns = (per_page.max(1) as f64).sqrt().ceil() as usize;
    grid(per_page, columns, SortKey::FamilyGenusSpecies)
}

fn by_peak_then_name(a: &PhenologyEntry, b: &PhenologyEntry) -> Ordering {
    a.summary
        .peak_week
        .total_cmp(&b.summary.peak_week)
        .then_with(|| a.record.name().cmp(b.record.name()))
}

/// Split an ordered list into pages, labelling contiguous groups
///
/// A group cut by a page boundary repeats its header on the next page with
/// `continued` set.
fn paginate<T>(
    entries: Vec<T>,
    per_page: usize,
    layout: LayoutHint,
    group_of: Option<&dyn Fn(&T) -> String>,
) -> Vec<Page<T>> {
    let per_page = per_page.max(1);
    let mut pages = Vec::new();
    let mut last_group: Option<String> = None;
    let mut iter = entries.into_iter().peekable();

    while iter.peek().is_some() {
        let chunk: Vec<T> = iter.by_ref().take(per_page).collect();
        let mut groups: Vec<GroupHeader> = Vec::new();

        if let Some(group_of) = group_of {
            for (idx, entry) in chunk.iter().enumerate() {
                let label = group_of(entry);
                match groups.last_mut() {
                    Some(current) if current.label == label => current.len += 1,
                    _ => {
                        let continued = idx == 0 && last_group.as_deref() == Some(label.as_str());
                        groups.push(GroupHeader {
                            label,
                            start: idx,
                            len: 1,
                            continued,
                        });
                    }
                }
            }
            last_group = groups.last().map(|g| g.label.clone());
        }

        pages.push(Page {
            number: pages.len() + 1,
            entries: chunk,
            groups,
            layout,
        });
    }

    pages
}

/// First known family among a genus' species, else the placeholder
fn genus_family<'a>(species: &[&'a SpeciesRecord]) -> &'a str {
    species
        .iter()
        .map(|r| r.species.family.as_str())
        .find(|f| *f != UNKNOWN_FAMILY)
        .unwrap_or(UNKNOWN_FAMILY)
}

/// Genus-faceted bar chart pages
///
/// Genera are ordered by (family, genus) and species by name. Genera are
/// packed onto pages; a genus that fits on one page is never split, and one
/// that does not fit in the remaining slots starts a new page. A genus larger
/// than a page fills whole pages and continues with a repeated header.
pub fn plan_genus_pages(records: &[SpeciesRecord], per_page: usize) -> Vec<Page<SpeciesRecord>> {
    let per_page = per_page.max(1);
    let layout = facet_grid(per_page);

    let mut genera: BTreeMap<&str, Vec<&SpeciesRecord>> = BTreeMap::new();
    for record in records {
        genera.entry(record.species.genus.as_str()).or_default().push(record);
    }

    let mut ordered: Vec<(&str, &str, Vec<&SpeciesRecord>)> = genera
        .into_iter()
        .map(|(genus, mut species)| {
            species.sort_by(|a, b| a.name().cmp(b.name()));
            let family = genus_family(&species);
            (family, genus, species)
        })
        .collect();
    ordered.sort_by(|a, b| a.0.cmp(b.0).then_with(|| a.1.cmp(b.1)));

    let mut pages: Vec<Page<SpeciesRecord>> = Vec::new();
    let mut entries: Vec<SpeciesRecord> = Vec::new();
    let mut groups: Vec<GroupHeader> = Vec::new();

    let mut flush = |entries: &mut Vec<SpeciesRecord>, groups: &mut Vec<GroupHeader>| {
        if !entries.is_empty() {
            pages.push(Page {
                number: pages.len() + 1,
                entries: std::mem::take(entries),
                groups: std::mem::take(groups),
                layout,
            });
        }
    };

    for (family, genus, species) in ordered {
        let label = format!("{} ({})", genus, family);

        if species.len() <= per_page && per_page - entries.len() < species.len() {
            flush(&mut entries, &mut groups);
        }
        if species.len() > per_page {
            flush(&mut entries, &mut groups);
        }

        for (chunk_idx, chunk) in species.chunks(per_page).enumerate() {
            if entries.len() == per_page {
                flush(&mut entries, &mut groups);
            }
            groups.push(GroupHeader {
                label: label.clone(),
                start: entries.len(),
                len: chunk.len(),
                continued: chunk_idx > 0,
            });
            entries.extend(chunk.iter().map(|r| (*r).clone()));
        }
    }
    flush(&mut entries, &mut groups);

    pages
}

/// Ridge plot pages: native species with phenology, ranked by peak week
///
/// Rank order runs across page boundaries; pages are never re-sorted.
pub fn plan_ridge_pages(records: &[SpeciesRecord], per_page: usize) -> Vec<Page<PhenologyEntry>> {
    let mut entries: Vec<PhenologyEntry> = records
        .iter()
        .filter(|r| r.species.native)
        .filter_map(PhenologyEntry::from_record)
        .collect();
    entries.sort_by(by_peak_then_name);

    paginate(entries, per_page, grid(per_page, 1, SortKey::PeakWeek), None)
}

/// Rare-species table rows (`ct_rare` with phenology), by peak week
pub fn plan_rare_table(records: &[SpeciesRecord], rows_per_page: usize) -> Vec<Page<PhenologyEntry>> {
    let mut entries: Vec<PhenologyEntry> = records
        .iter()
        .filter(|r| r.category == AbundanceCategory::CtRare)
        .filter_map(PhenologyEntry::from_record)
        .collect();
    entries.sort_by(by_peak_then_name);

    paginate(entries, rows_per_page, grid(rows_per_page, 1, SortKey::PeakWeek), None)
}

/// Abundance summary table: every classified species by (category, family, name)
pub fn plan_abundance_table(records: &[SpeciesRecord], rows_per_page: usize) -> Vec<Page<SpeciesRecord>> {
    let mut entries: Vec<SpeciesRecord> = records.to_vec();
    entries.sort_by(|a, b| {
        a.category
            .cmp(&b.category)
            .then_with(|| a.species.family.cmp(&b.species.family))
            .then_with(|| a.name().cmp(b.name()))
    });

    let category_label = |r: &SpeciesRecord| r.category.as_str().to_string();
    paginate(
        entries,
        rows_per_page,
        grid(rows_per_page, 1, SortKey::CategoryFamilySpecies),
        Some(&category_label as &dyn Fn(&SpeciesRecord) -> String),
    )
}
