//! DataFrame column helpers with validation
//!
//! Input tables come from outside the pipeline, so every required column is
//! checked up front and reported by name.

use anyhow::{anyhow, Context, Result};
use polars::prelude::*;
use std::collections::HashSet;

/// Materialize a LazyFrame with every column cast to string
///
/// Parquet exports type numeric columns (`gbifID`, `year`); the loaders read
/// all fields as text.
pub fn materialize_as_strings(lazy: LazyFrame, context: &str) -> Result<DataFrame> {
    lazy.select([all().cast(DataType::String)])
        .collect()
        .with_context(|| format!("{}: Failed to materialize columns", context))
}

/// Check that every required column is present
///
/// # Errors
/// Names the first missing column and lists the available ones.
pub fn require_columns(df: &DataFrame, columns: &[&str], context: &str) -> Result<()> {
    let actual_cols: HashSet<String> = df
        .get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect();

    for &expected in columns {
        if !actual_cols.contains(expected) {
            let mut available: Vec<_> = actual_cols.iter().collect();
            available.sort();
            return Err(anyhow!(
                "{}: Missing expected column '{}'. Available columns: {:?}",
                context,
                expected,
                available
            ));
        }
    }

    Ok(())
}

/// String view of a column, `None` when absent or not textual
pub fn optional_str<'a>(df: &'a DataFrame, name: &str) -> Option<&'a StringChunked> {
    df.column(name).ok().and_then(|c| c.str().ok())
}

/// String view of a required column
pub fn required_str<'a>(df: &'a DataFrame, name: &str, context: &str) -> Result<&'a StringChunked> {
    df.column(name)
        .with_context(|| format!("{}: Missing {} column", context, name))?
        .str()
        .with_context(|| format!("{}: Column '{}' is not string type", context, name))
}
