//! Common-name cache
//!
//! JSON Lines file of `{"scientific_name", "common_name"}` entries. Read once
//! at start; each successful lookup is appended and flushed immediately so an
//! interrupted run keeps everything resolved so far.

use anyhow::{Context, Result};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct CacheEntry {
    scientific_name: String,
    common_name: String,
}

#[derive(Debug, Default)]
pub struct NameCache {
    path: Option<PathBuf>,
    entries: FxHashMap<String, String>,
}

impl NameCache {
    /// In-memory cache that is never persisted
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open a cache file, creating nothing until the first insert
    ///
    /// Unreadable lines are skipped with a warning; later lines win on
    /// duplicate names.
    pub fn open(path: &Path) -> Result<Self> {
        let mut entries = FxHashMap::default();

        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read name cache: {:?}", path))?;

            for (line_no, line) in contents.lines().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<CacheEntry>(line) {
                    Ok(entry) => {
                        entries.insert(entry.scientific_name, entry.common_name);
                    }
                    Err(e) => {
                        tracing::warn!("Skipping name cache line {} in {:?}: {}", line_no + 1, path, e);
                    }
                }
            }
        }

        tracing::info!("Name cache: {} entries from {:?}", entries.len(), path);
        Ok(Self {
            path: Some(path.to_path_buf()),
            entries,
        })
    }

    pub fn get(&self, scientific_name: &str) -> Option<&str> {
        self.entries.get(scientific_name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record a resolved name and append it to the cache file
    pub fn insert(&mut self, scientific_name: &str, common_name: &str) -> Result<()> {
        self.entries
            .insert(scientific_name.to_string(), common_name.to_string());

        let Some(path) = &self.path else {
            return Ok(());
        };

        let line = serde_json::to_string(&CacheEntry {
            scientific_name: scientific_name.to_string(),
            common_name: common_name.to_string(),
        })?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open name cache for append: {:?}", path))?;
        writeln!(file, "{}", line)
            .and_then(|_| file.flush())
            .with_context(|| format!("Failed to write name cache: {:?}", path))
    }
}
