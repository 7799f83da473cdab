//! Configuration types.
//!
//! `PipelineConfig` describes one ETL run and is read from a TOML file. The
//! logging enums are used by the command line.

use std::path::PathBuf;

use clap::ValueEnum;
use serde::Deserialize;

use crate::config::constants::{
    DEFAULT_LOG_FILE, DEFAULT_SENTINEL, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT,
};
use crate::models::{Value, ValueKind};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Where the raw table comes from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Source {
    /// HTML page fetched over HTTP(S)
    Url { url: String },
    /// HTML page on disk
    HtmlFile { path: PathBuf },
    /// Header-less CSV file, columns named by the config
    CsvFile { path: PathBuf },
}

impl Source {
    /// Whether rows come from an HTML table (and need a locator).
    pub fn is_html(&self) -> bool {
        !matches!(self, Source::CsvFile { .. })
    }

    pub fn describe(&self) -> String {
        match self {
            Source::Url { url } => url.clone(),
            Source::HtmlFile { path } | Source::CsvFile { path } => path.display().to_string(),
        }
    }
}

/// How to find the target table in an HTML document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocatorConfig {
    /// k-th `<table>` in document order (0-based)
    Index(usize),
    /// Table captioned by, or following a heading containing, this text
    Heading(String),
}

/// How to read a value out of a table cell.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionRule {
    /// All text in the cell, trimmed
    #[default]
    Text,
    /// Text before the first line break
    FirstLine,
    /// Text of the first element matching a CSS selector inside the cell
    Nested(String),
    /// Text of the n-th child element of the cell (0-based)
    Child(usize),
}

/// One output column and where its value comes from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ColumnConfig {
    pub name: String,
    /// Declared kind; only CSV sources parse values at extraction time
    #[serde(default = "default_kind")]
    pub kind: ValueKind,
    /// `<td>` index in the row; defaults to the column's position
    pub cell: Option<usize>,
    #[serde(default)]
    pub rule: ExtractionRule,
}

fn default_kind() -> ValueKind {
    ValueKind::Text
}

/// A derived-column computation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum TransformStep {
    /// Parse a text column to a decimal in place
    Numeric { column: String },
    /// `target = round(source * factor)`
    Scale {
        source: String,
        target: String,
        factor: f64,
    },
    /// `target = round(source * rate[currency])`
    ConvertCurrency {
        source: String,
        target: String,
        currency: String,
    },
}

/// Store write mode, chosen explicitly per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreMode {
    /// Drop and recreate the table
    #[default]
    Replace,
    /// Add rows to a table with the same columns
    Append,
}

/// A literal cell value in `append_rows`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LiteralValue {
    Integer(i64),
    Decimal(f64),
    Text(String),
}

impl LiteralValue {
    /// Converts the literal to a value of `kind`, widening integers to decimals.
    pub fn to_value(&self, kind: ValueKind) -> Option<Value> {
        match (self, kind) {
            (LiteralValue::Integer(i), ValueKind::Integer) => Some(Value::Integer(*i)),
            (LiteralValue::Integer(i), ValueKind::Decimal) => Some(Value::Decimal(*i as f64)),
            (LiteralValue::Decimal(d), ValueKind::Decimal) => Some(Value::Decimal(*d)),
            (LiteralValue::Text(s), ValueKind::Text) => Some(Value::Text(s.clone())),
            _ => None,
        }
    }
}

/// Library configuration for one pipeline run.
///
/// # Examples
///
/// ```no_run
/// use table_etl::PipelineConfig;
///
/// let config = PipelineConfig::load(std::path::Path::new("demos/gdp.toml")).unwrap();
/// assert_eq!(config.table_name, "Countries_by_GDP");
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    pub source: Source,

    /// Required for HTML sources
    pub locator: Option<LocatorConfig>,

    /// Leading rows (headers, sub-headers) to skip
    #[serde(default)]
    pub skip_rows: usize,

    /// Cell contents that mark a row as "no data"
    #[serde(default = "default_sentinels")]
    pub sentinels: Vec<String>,

    pub columns: Vec<ColumnConfig>,

    #[serde(default)]
    pub transform: Vec<TransformStep>,

    /// `Currency,Rate` CSV used by `convert_currency` steps
    pub exchange_rates: Option<PathBuf>,

    /// Flat-file sink, overwritten every run
    pub output_csv: PathBuf,

    /// SQLite database file
    pub db_path: PathBuf,

    pub table_name: String,

    #[serde(default)]
    pub store_mode: StoreMode,

    /// Rows appended to the table after the main load
    #[serde(default)]
    pub append_rows: Vec<Vec<LiteralValue>>,

    /// Read-only statements run after loading
    #[serde(default)]
    pub queries: Vec<String>,

    /// Progress log
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,

    /// Fetch timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_sentinels() -> Vec<String> {
    vec![DEFAULT_SENTINEL.to_string()]
}

fn default_log_file() -> PathBuf {
    PathBuf::from(DEFAULT_LOG_FILE)
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(
            log::LevelFilter::from(LogLevel::Error),
            log::LevelFilter::Error
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Warn),
            log::LevelFilter::Warn
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Info),
            log::LevelFilter::Info
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Debug),
            log::LevelFilter::Debug
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Trace),
            log::LevelFilter::Trace
        );
    }

    #[test]
    fn test_literal_value_widening() {
        assert_eq!(
            LiteralValue::Integer(9).to_value(ValueKind::Decimal),
            Some(Value::Decimal(9.0))
        );
        assert_eq!(
            LiteralValue::Text("L0010".into()).to_value(ValueKind::Text),
            Some(Value::Text("L0010".into()))
        );
        assert_eq!(LiteralValue::Decimal(1.5).to_value(ValueKind::Integer), None);
        assert_eq!(LiteralValue::Integer(1).to_value(ValueKind::Text), None);
    }

    #[test]
    fn test_source_is_html() {
        assert!(Source::Url {
            url: "https://example.com".into()
        }
        .is_html());
        assert!(!Source::CsvFile {
            path: PathBuf::from("a.csv")
        }
        .is_html());
    }
}
