//! Durable progress log.
//!
//! Each entry is one line `<timestamp>,<message>` appended to a plain text file.
//! This is separate from diagnostic logging: only the pipeline driver writes here.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::config::LOG_TIMESTAMP_FORMAT;

/// Sink for progress entries.
///
/// Implementations must never fail the caller; write errors are reported
/// through diagnostic logging instead.
pub trait ProgressLog {
    fn log_progress(&self, message: &str);
}

/// Appends progress entries to a file, opening it for each entry.
#[derive(Debug, Clone)]
pub struct FileProgressLog {
    path: PathBuf,
}

impl FileProgressLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Formats one entry, newline included.
pub fn format_entry(message: &str) -> String {
    format!("{},{}\n", Local::now().format(LOG_TIMESTAMP_FORMAT), message)
}

impl ProgressLog for FileProgressLog {
    fn log_progress(&self, message: &str) {
        let entry = format_entry(message);
        // One write per entry so lines from the same process never interleave.
        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| file.write_all(entry.as_bytes()));
        if let Err(e) = result {
            log::error!(
                "Failed to write progress entry to {}: {e}",
                self.path.display()
            );
        }
    }
}
