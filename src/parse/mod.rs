//! Row extraction.
//!
//! Turns a raw source into a `RecordSet`:
//! - HTML tables, located by a `TableLocator` and walked row by row
//! - Header-less CSV files
//!
//! Rows that are incomplete are dropped, never emitted with placeholders. An
//! extraction that keeps no rows at all is an error.

mod csv;
mod locator;
mod table;

// Re-export public API
pub use self::csv::{extract_csv, extract_csv_file};
pub use locator::{locator_from_config, HeadingLocator, IndexLocator, TableLocator};
pub use table::{extract_table, TableSpec};
