//! Utility modules shared by the loaders
//!
//! - Dates: Darwin Core event date parsing
//! - LazyFrame helpers: column validation and string materialization

pub mod dates;
pub mod lazy_helpers;

pub use dates::{date_from_parts, parse_event_date};
pub use lazy_helpers::{materialize_as_strings, optional_str, require_columns, required_str};
