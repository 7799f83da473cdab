//! Error handling.
//!
//! Each pipeline component has its own error type:
//! - **Extraction**: table not found, no rows matched, malformed CSV rows, fetch failures
//! - **Transform**: non-numeric values, missing exchange rates
//! - **Sink**: file or store write failures, including partial writes
//! - **Query**: malformed statements, unknown tables or columns
//!
//! `EtlError` unifies them for the pipeline driver, and `PipelineError` adds the
//! last stage that completed before the failure.

mod types;

// Re-export public API
pub use types::{
    ConfigError, DatabaseError, EtlError, ExtractionError, InitializationError, PipelineError,
    QueryError, SchemaMismatchError, SinkError, SinkKind, StoreWriteError, TransformError,
};
