//! Flat-file CSV sink.
//!
//! Output matches pandas `DataFrame.to_csv`: a leading unnamed index column
//! (`0..n-1`) followed by the record columns.

use std::path::Path;

use csv::Writer;
use tempfile::NamedTempFile;

use crate::error_handling::SinkError;
use crate::models::{RecordSet, Value};

/// Writes `records` to `path`, replacing any previous file.
///
/// The rows go to a temporary file in the target's directory which is then renamed
/// over the target, so readers never see a half-written file.
pub fn write_csv(records: &RecordSet, path: &Path) -> Result<(), SinkError> {
    let file_error = |reason: String| SinkError::FileWrite {
        path: path.to_path_buf(),
        reason,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| file_error(e.to_string()))?;

    {
        let mut writer = Writer::from_writer(tmp.as_file_mut());
        let mut header = vec![String::new()];
        header.extend(records.schema().names());
        writer
            .write_record(&header)
            .map_err(|e| file_error(e.to_string()))?;

        for (index, record) in records.records().iter().enumerate() {
            let mut row = Vec::with_capacity(record.values().len() + 1);
            row.push(index.to_string());
            row.extend(record.values().iter().map(cell));
            writer
                .write_record(&row)
                .map_err(|e| file_error(e.to_string()))?;
        }
        writer.flush().map_err(|e| file_error(e.to_string()))?;
    }

    tmp.persist(path).map_err(|e| file_error(e.error.to_string()))?;
    log::debug!("Wrote {} rows to {}", records.len(), path.display());
    Ok(())
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
