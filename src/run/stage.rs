//! Pipeline stages.

use std::fmt;

/// Where a pipeline run is.
///
/// Runs move forward through `Idle → Extracting → Transforming → LoadingFile →
/// LoadingStore → Querying → Done`. `Failed` is reachable from every
/// non-terminal stage. `Done` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Extracting,
    Transforming,
    LoadingFile,
    LoadingStore,
    Querying,
    Done,
    Failed,
}

impl Stage {
    /// The stage a successful run enters after this one.
    pub fn next(self) -> Stage {
        match self {
            Stage::Idle => Stage::Extracting,
            Stage::Extracting => Stage::Transforming,
            Stage::Transforming => Stage::LoadingFile,
            Stage::LoadingFile => Stage::LoadingStore,
            Stage::LoadingStore => Stage::Querying,
            Stage::Querying => Stage::Done,
            Stage::Done => Stage::Done,
            Stage::Failed => Stage::Failed,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Done | Stage::Failed)
    }

    /// Progress log entry written when this stage completes.
    pub fn completion_message(self) -> &'static str {
        match self {
            Stage::Idle => "Preliminaries complete. Initiating ETL process",
            Stage::Extracting => "Data extraction complete. Initiating Transformation process",
            Stage::Transforming => "Data transformation complete. Initiating Loading process",
            Stage::LoadingFile => "Data saved to CSV file",
            Stage::LoadingStore => "Data loaded to Database as a table, Executing queries",
            Stage::Querying => "Queries successfully executed",
            Stage::Done => "Process Complete",
            Stage::Failed => "Process Failed",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle => "Idle",
            Stage::Extracting => "Extracting",
            Stage::Transforming => "Transforming",
            Stage::LoadingFile => "Loading(File)",
            Stage::LoadingStore => "Loading(Store)",
            Stage::Querying => "Querying",
            Stage::Done => "Done",
            Stage::Failed => "Failed",
        };
        f.write_str(name)
    }
}
