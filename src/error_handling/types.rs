//! Error type definitions.
//!
//! This module defines the error types raised by every pipeline component.

use std::path::PathBuf;

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use thiserror::Error;

use crate::run::Stage;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Error types for opening the SQLite store.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error creating the database file.
    #[error("Database file creation error: {0}")]
    FileCreationError(String),

    /// SQL execution error.
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),
}

/// Errors raised while loading or validating a pipeline configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for a pipeline.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration parsed but is not usable.
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Errors produced by the Row Extractor and the document sources feeding it.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The table locator matched no table in the document.
    #[error("Table not found: {locator} (document has {tables_found} tables)")]
    TableNotFound {
        locator: String,
        tables_found: usize,
    },

    /// The table was found but no row survived filtering.
    #[error("No rows matched in table ({rows_seen} rows inspected after skipping)")]
    NoRowsMatched { rows_seen: usize },

    /// A CSV line had the wrong shape or a value of the wrong kind.
    #[error("Malformed row at line {line}: {reason}")]
    MalformedRow { line: u64, reason: String },

    /// Fetching the source document exceeded the configured deadline.
    #[error("Timed out fetching {url}")]
    Timeout { url: String },

    /// Fetching the source document failed.
    #[error("Failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: ReqwestError,
    },

    /// Reading a local source file failed.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV reader rejected the input.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Errors produced by the Record Transformer.
#[derive(Error, Debug)]
pub enum TransformError {
    /// A source value is not numeric after separator stripping.
    #[error("Non-numeric value {value:?} in column {column} (row {row})")]
    NonNumeric {
        column: String,
        row: usize,
        value: String,
    },

    /// A key required from the auxiliary table is absent.
    #[error("Missing auxiliary key: {key}")]
    MissingAuxiliaryKey { key: String },

    /// A step references a column the record set does not have.
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    /// The auxiliary table could not be loaded.
    #[error("Failed to load auxiliary table {path}: {reason}")]
    AuxiliaryLoad { path: PathBuf, reason: String },

    /// The derived columns do not form a valid schema.
    #[error(transparent)]
    Schema(#[from] SchemaMismatchError),
}

/// Column sets (or column kinds) of two tables or records disagree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Schema mismatch{}: expected [{}], found [{}]", table_suffix(.table), .expected.join(", "), .found.join(", "))]
pub struct SchemaMismatchError {
    /// Destination table, when the mismatch was found against the store
    pub table: Option<String>,
    /// Columns that were expected
    pub expected: Vec<String>,
    /// Columns that were found
    pub found: Vec<String>,
}

fn table_suffix(table: &Option<String>) -> String {
    table
        .as_ref()
        .map(|t| format!(" for table {t}"))
        .unwrap_or_default()
}

/// Errors produced by the Query Runner.
#[derive(Error, Debug)]
pub enum QueryError {
    /// The statement is empty or not valid SQL.
    #[error("Malformed statement {statement:?}: {reason}")]
    Malformed { statement: String, reason: String },

    /// The statement references a table or column that does not exist.
    #[error("Unknown table or column in {statement:?}: {reason}")]
    UnknownTableOrColumn { statement: String, reason: String },

    /// Any other database failure while running the statement.
    #[error("Query failed: {0}")]
    Database(#[from] sqlx::Error),
}

/// Errors raised by a store write.
#[derive(Error, Debug)]
pub enum StoreWriteError {
    /// The store could not be opened.
    #[error("Failed to open store: {0}")]
    Open(DatabaseError),

    /// Append target has a different column set.
    #[error(transparent)]
    SchemaMismatch(#[from] SchemaMismatchError),

    /// SQL execution error.
    #[error("SQL error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Which half of the dual sink an outcome refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkKind {
    /// The flat CSV file
    File,
    /// The SQLite store
    Store,
}

impl std::fmt::Display for SinkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SinkKind::File => f.write_str("file"),
            SinkKind::Store => f.write_str("store"),
        }
    }
}

/// Errors produced by the Dual Sink Writer.
#[derive(Error, Debug)]
pub enum SinkError {
    /// The flat file could not be written.
    #[error("Failed to write {path}: {reason}")]
    FileWrite { path: PathBuf, reason: String },

    /// The store could not be written.
    #[error("Failed to write table {table}: {source}")]
    StoreWrite {
        table: String,
        #[source]
        source: StoreWriteError,
    },

    /// One sink was written, the other failed. The written sink is left in place.
    #[error("Partial write ({succeeded} sink written): {source}")]
    PartialWrite {
        succeeded: SinkKind,
        #[source]
        source: Box<SinkError>,
    },

    /// The main load committed, then appending the configured literal rows failed.
    #[error("Main load of table {table} committed ({rows_loaded} rows); appending literal rows failed: {source}")]
    AppendAfterLoad {
        table: String,
        rows_loaded: u64,
        #[source]
        source: StoreWriteError,
    },
}

impl SinkError {
    /// Returns the schema mismatch at the root of this error, if any.
    pub fn schema_mismatch(&self) -> Option<&SchemaMismatchError> {
        match self {
            SinkError::StoreWrite {
                source: StoreWriteError::SchemaMismatch(e),
                ..
            }
            | SinkError::AppendAfterLoad {
                source: StoreWriteError::SchemaMismatch(e),
                ..
            } => Some(e),
            SinkError::PartialWrite { source, .. } => source.schema_mismatch(),
            _ => None,
        }
    }
}

/// Any component error surfaced by a pipeline run.
#[derive(Error, Debug)]
pub enum EtlError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Initialization(#[from] InitializationError),
    #[error(transparent)]
    Database(#[from] DatabaseError),
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error(transparent)]
    Transform(#[from] TransformError),
    #[error(transparent)]
    SchemaMismatch(#[from] SchemaMismatchError),
    #[error(transparent)]
    Sink(#[from] SinkError),
    #[error(transparent)]
    Query(#[from] QueryError),
}

/// A failed pipeline run: the error plus the last stage that completed.
#[derive(Error, Debug)]
#[error("Pipeline failed after stage {last_completed}: {source}")]
pub struct PipelineError {
    /// Last stage that completed successfully (`Idle` if none did)
    pub last_completed: Stage,
    /// Component error that stopped the run
    #[source]
    pub source: EtlError,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_mismatch_display() {
        let err = SchemaMismatchError {
            table: Some("Largest_banks".to_string()),
            expected: vec!["Name".into(), "MC_USD_Billion".into()],
            found: vec!["Name".into()],
        };
        assert_eq!(
            err.to_string(),
            "Schema mismatch for table Largest_banks: expected [Name, MC_USD_Billion], found [Name]"
        );
    }

    #[test]
    fn test_schema_mismatch_found_through_partial_write() {
        let mismatch = SchemaMismatchError {
            table: None,
            expected: vec!["a".into()],
            found: vec!["b".into()],
        };
        let err = SinkError::PartialWrite {
            succeeded: SinkKind::File,
            source: Box::new(SinkError::StoreWrite {
                table: "t".into(),
                source: StoreWriteError::SchemaMismatch(mismatch.clone()),
            }),
        };
        assert_eq!(err.schema_mismatch(), Some(&mismatch));
        assert!(err.to_string().starts_with("Partial write (file sink written)"));
    }

    #[test]
    fn test_append_after_load_names_committed_table() {
        let err = SinkError::AppendAfterLoad {
            table: "INSTRUCTOR".into(),
            rows_loaded: 3,
            source: StoreWriteError::Database(sqlx::Error::PoolClosed),
        };
        assert!(err
            .to_string()
            .starts_with("Main load of table INSTRUCTOR committed (3 rows); appending literal rows failed"));
        assert!(err.schema_mismatch().is_none());
    }

    #[test]
    fn test_file_write_has_no_schema_mismatch() {
        let err = SinkError::FileWrite {
            path: PathBuf::from("out.csv"),
            reason: "disk full".into(),
        };
        assert!(err.schema_mismatch().is_none());
    }
}
