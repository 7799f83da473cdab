//! table_etl library: table extraction, transformation and loading
//!
//! This library scrapes one table from an HTML page (or reads a header-less CSV
//! file), derives numeric columns, writes the result to a CSV file and a SQLite
//! table, and runs read-only queries against the loaded table. Each completed
//! stage is recorded in a durable progress log.
//!
//! # Example
//!
//! ```no_run
//! use table_etl::{run_pipeline, PipelineConfig};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PipelineConfig::load(std::path::Path::new("demos/banks.toml"))?;
//! let report = run_pipeline(config).await?;
//! println!("Loaded {} rows into {}", report.rows_written, report.table);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Stages run strictly one after another,
//! so a current-thread runtime is enough.

pub mod app;
pub mod config;
mod error_handling;
pub mod export;
mod fetch;
pub mod initialization;
pub mod models;
pub mod parse;
pub mod run;
pub mod storage;
pub mod transform;
mod utils;

// Re-export public API
pub use config::{LogFormat, LogLevel, PipelineConfig, StoreMode};
pub use error_handling::{
    ConfigError, DatabaseError, EtlError, ExtractionError, InitializationError, PipelineError,
    QueryError, SchemaMismatchError, SinkError, SinkKind, StoreWriteError, TransformError,
};
pub use models::{Column, Record, RecordSet, Schema, Value, ValueKind};
pub use run::{run_pipeline, PipelineDriver, QueryOutcome, RunReport, Stage};
pub use storage::Store;
