//! Header-less CSV row extraction.
//!
//! Columns are named by the configuration, in order. Unlike HTML cells, CSV
//! values are parsed to their declared kind here, and a line with the wrong shape
//! is an error rather than a skipped row.

use std::io::Read;
use std::path::Path;

use crate::error_handling::ExtractionError;
use crate::models::{Record, RecordSet, Value, ValueKind};
use crate::parse::table::TableSpec;
use crate::transform::parse_number;

/// Reads a header-less CSV file into a record set.
pub fn extract_csv_file(path: &Path, spec: &TableSpec) -> Result<RecordSet, ExtractionError> {
    let file = std::fs::File::open(path).map_err(|source| ExtractionError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    extract_csv(file, spec)
}

/// Reads header-less CSV from any reader into a record set.
///
/// # Errors
///
/// - `MalformedRow` for a line with the wrong field count or an unparseable value.
///   When every column reads its own position the line must have exactly one
///   field per column; with explicit cell indices it needs at least enough
///   fields to reach the highest index.
/// - `NoRowsMatched` if every line was skipped or dropped
pub fn extract_csv<R: Read>(reader: R, spec: &TableSpec) -> Result<RecordSet, ExtractionError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut records = RecordSet::new(spec.schema_with(|c| c.kind)?);
    let needed = (0..spec.columns.len())
        .map(|position| spec.cell_index(position) + 1)
        .max()
        .unwrap_or(0);
    let positional =
        (0..spec.columns.len()).all(|position| spec.cell_index(position) == position);
    let mut rows_seen = 0usize;

    for (index, row) in reader.records().enumerate() {
        let row = row?;
        if index < spec.skip_rows {
            continue;
        }
        rows_seen += 1;
        let line = row.position().map(|p| p.line()).unwrap_or(index as u64 + 1);

        if row.len() < needed || (positional && row.len() != needed) {
            return Err(ExtractionError::MalformedRow {
                line,
                reason: format!("expected {needed} fields, found {}", row.len()),
            });
        }

        let mut values = Vec::with_capacity(spec.columns.len());
        for (position, column) in spec.columns.iter().enumerate() {
            let raw = row.get(spec.cell_index(position)).unwrap_or("").trim();
            if spec.is_blank(raw) {
                break;
            }
            let value = match column.kind {
                ValueKind::Text => Some(Value::Text(raw.to_string())),
                ValueKind::Integer => raw.parse::<i64>().ok().map(Value::Integer),
                ValueKind::Decimal => parse_number(raw).map(Value::Decimal),
            };
            match value {
                Some(v) => values.push(v),
                None => {
                    return Err(ExtractionError::MalformedRow {
                        line,
                        reason: format!("{raw:?} is not a valid {} for {}", column.kind, column.name),
                    })
                }
            }
        }

        if values.len() != spec.columns.len() {
            log::debug!("Dropping CSV line {line} (empty or no data)");
            continue;
        }

        records
            .push(Record::new(values))
            .map_err(|e| ExtractionError::MalformedRow {
                line,
                reason: e.to_string(),
            })?;
    }

    if records.is_empty() {
        return Err(ExtractionError::NoRowsMatched { rows_seen });
    }
    Ok(records)
}
