//! Diagnostic logger setup.
//!
//! Diagnostics go to stderr through `env_logger`. They are separate from the
//! durable progress log, which only the pipeline driver writes.

use std::io::Write;

use chrono::{SecondsFormat, Utc};
use colored::*;
use log::{Level, LevelFilter};

use crate::config::LogFormat;
use crate::error_handling::InitializationError;

/// Dependency modules capped below the requested level.
const QUIET_MODULES: &[(&str, LevelFilter)] = &[
    ("html5ever", LevelFilter::Error),
    ("selectors", LevelFilter::Warn),
    ("sqlx", LevelFilter::Info),
    ("reqwest", LevelFilter::Info),
    ("hyper", LevelFilter::Info),
];

/// Installs the global logger.
///
/// `RUST_LOG` is read first; `level` then overrides it for this crate and the
/// default filter, e.g. `RUST_LOG=debug table_etl run demos/banks.toml --log-level info`.
///
/// # Errors
///
/// `InitializationError::LoggerError` if a logger is already installed.
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    colored::control::set_override(true);

    let mut builder = env_logger::Builder::from_default_env();
    builder.filter_level(level);
    for (module, cap) in QUIET_MODULES {
        builder.filter_module(module, (*cap).min(level));
    }
    builder.filter_module("table_etl", level);

    match format {
        LogFormat::Json => builder.format(|buf, record| {
            let line = json_line(record.level(), record.target(), &record.args().to_string());
            writeln!(buf, "{line}")
        }),
        LogFormat::Plain => builder.format(|buf, record| {
            let line = plain_line(record.level(), record.target(), &record.args().to_string());
            writeln!(buf, "{line}")
        }),
    };

    builder.try_init()?;
    Ok(())
}

/// One JSON object per record.
fn json_line(level: Level, target: &str, message: &str) -> String {
    serde_json::json!({
        "ts": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        "level": level.to_string(),
        "target": target,
        "msg": message,
    })
    .to_string()
}

fn plain_line(level: Level, target: &str, message: &str) -> String {
    let tag = format!("{level:<5}");
    let tag = match level {
        Level::Error => tag.red().bold(),
        Level::Warn => tag.yellow(),
        Level::Info => tag.green(),
        Level::Debug => tag.blue(),
        Level::Trace => tag.purple(),
    };
    format!("{tag} {} {message}", target.cyan())
}
