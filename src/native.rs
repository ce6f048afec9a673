//! Native status join
//!
//! Left join of species against the regional checklist. Misses default to
//! non-native and are reported, never fatal.

use crate::taxonomy::{collapse_to_species, normalize_key};
use rustc_hash::FxHashMap;
use serde::Serialize;

/// Checklist keyed by normalized species name → native flag
#[derive(Debug, Clone, Default)]
pub struct Checklist {
    entries: FxHashMap<String, bool>,
}

impl Checklist {
    /// Build from (name, status) rows
    ///
    /// Infraspecific rows count toward their species; a species is native
    /// when any of its rows carries `native_code`.
    pub fn from_rows<'a, I>(rows: I, native_code: &str) -> Self
    where
        I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
    {
        let mut entries: FxHashMap<String, bool> = FxHashMap::default();

        for (name, status) in rows {
            let key = match collapse_to_species(name) {
                Some(species) => normalize_key(&species),
                None => normalize_key(name),
            };
            if key.is_empty() {
                continue;
            }

            let native = status
                .map(|s| s.trim().eq_ignore_ascii_case(native_code.trim()))
                .unwrap_or(false);
            let entry = entries.entry(key).or_insert(false);
            *entry |= native;
        }

        Self { entries }
    }

    /// `Some(native)` when the species is listed, `None` on a miss
    pub fn lookup(&self, scientific_name: &str) -> Option<bool> {
        self.entries.get(&normalize_key(scientific_name)).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Outcome of joining a species list against the checklist
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JoinReport {
    pub matched: usize,
    pub native: usize,
    /// Names with no checklist row, sorted
    pub unmatched: Vec<String>,
}

impl JoinReport {
    pub fn unmatched_count(&self) -> usize {
        self.unmatched.len()
    }
}

/// Native flag for every name, plus a join report
pub fn join_native<'a, I>(names: I, checklist: &Checklist) -> (FxHashMap<String, bool>, JoinReport)
where
    I: IntoIterator<Item = &'a str>,
{
    let mut flags = FxHashMap::default();
    let mut report = JoinReport::default();

    for name in names {
        let native = match checklist.lookup(name) {
            Some(native) => {
                report.matched += 1;
                native
            }
            None => {
                report.unmatched.push(name.to_string());
                false
            }
        };
        if native {
            report.native += 1;
        }
        flags.insert(name.to_string(), native);
    }

    report.unmatched.sort();
    (flags, report)
}
