//! Dual sink: the flat CSV file and the SQLite store.
//!
//! The file is written first, then the store. A store failure after a successful
//! file write is reported as `SinkError::PartialWrite`; the file is left in place.

mod csv;

use std::path::{Path, PathBuf};

pub use self::csv::write_csv;

use crate::config::StoreMode;
use crate::error_handling::{SinkError, SinkKind, StoreWriteError};
use crate::models::RecordSet;
use crate::storage::Store;

/// Where and how one run persists its records.
#[derive(Debug, Clone)]
pub struct SinkTargets {
    /// Flat file, overwritten on every run
    pub csv_path: PathBuf,
    /// Store table
    pub table: String,
    /// Replace or Append
    pub mode: StoreMode,
}

/// Outcome of a successful `persist`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistReport {
    pub csv_path: PathBuf,
    pub table: String,
    /// Rows inserted into the store
    pub rows_written: u64,
}

/// Writes the flat file. Exposed separately so the driver can log each sink as its own stage.
pub fn write_file(records: &RecordSet, csv_path: &Path) -> Result<(), SinkError> {
    write_csv(records, csv_path)
}

/// Writes the store table, assuming the file sink already succeeded.
pub async fn write_store(
    records: &RecordSet,
    store: &Store,
    table: &str,
    mode: StoreMode,
) -> Result<u64, SinkError> {
    store
        .write_records(table, records, mode)
        .await
        .map_err(|source| partial_write(table, source))
}

/// Opens the store after the file sink succeeded.
///
/// A failure here is a partial write: the flat file is already in place.
pub async fn open_store(db_path: &Path, table: &str) -> Result<Store, SinkError> {
    Store::open(db_path)
        .await
        .map_err(|e| partial_write(table, StoreWriteError::Open(e)))
}

/// Appends literal rows after the main load of `table` committed.
pub async fn append_literal_rows(
    records: &RecordSet,
    store: &Store,
    table: &str,
    rows_loaded: u64,
) -> Result<u64, SinkError> {
    store
        .write_records(table, records, StoreMode::Append)
        .await
        .map_err(|source| SinkError::AppendAfterLoad {
            table: table.to_string(),
            rows_loaded,
            source,
        })
}

fn partial_write(table: &str, source: StoreWriteError) -> SinkError {
    SinkError::PartialWrite {
        succeeded: SinkKind::File,
        source: Box::new(SinkError::StoreWrite {
            table: table.to_string(),
            source,
        }),
    }
}

/// Writes `records` to both sinks, file first.
///
/// # Errors
///
/// - `FileWrite` if the file could not be written (the store is not touched)
/// - `PartialWrite { succeeded: File, .. }` if the store write failed afterwards
pub async fn persist(
    records: &RecordSet,
    targets: &SinkTargets,
    store: &Store,
) -> Result<PersistReport, SinkError> {
    write_file(records, &targets.csv_path)?;
    let rows_written = write_store(records, store, &targets.table, targets.mode).await?;
    log::info!(
        "Persisted {} rows to {} and table {}",
        records.len(),
        targets.csv_path.display(),
        targets.table
    );
    Ok(PersistReport {
        csv_path: targets.csv_path.clone(),
        table: targets.table.clone(),
        rows_written,
    })
}
