//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (timeouts, formats, defaults)
//! - Pipeline configuration types, loaded from TOML
//! - Command-line options

mod cli;
mod constants;
mod load;
mod types;

pub use cli::{Cli, Command};
// Re-export all constants
pub use constants::*;
pub use types::{
    ColumnConfig, ExtractionRule, LiteralValue, LocatorConfig, LogFormat, LogLevel,
    PipelineConfig, Source, StoreMode, TransformStep,
};
