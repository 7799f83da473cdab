//! Application-level helpers: the progress log and report rendering.

pub mod logging;
pub mod report;

pub use logging::{FileProgressLog, ProgressLog};
pub use report::{print_report, render_record_set};
