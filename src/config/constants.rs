//! Configuration constants.
//!
//! Defaults for pipeline configuration and fixed formats used by the sinks and
//! the progress log.

/// Per-request timeout for fetching source documents, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Progress log written when the config does not name one
pub const DEFAULT_LOG_FILE: &str = "code_log.txt";

/// Cell marker meaning "no data"; rows containing it are dropped
pub const DEFAULT_SENTINEL: &str = "—";

/// Default User-Agent string for HTTP requests.
///
/// Generic Chrome-like string. Some archive mirrors reject requests without a
/// browser-looking agent. Override per pipeline with `user_agent`.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// `strftime` format of progress log timestamps (`2023-Sep-08-09:16:35`)
pub const LOG_TIMESTAMP_FORMAT: &str = "%Y-%b-%d-%H:%M:%S";

/// Decimal places kept by derived numeric columns
pub const DECIMAL_PLACES: i32 = 2;

/// Characters stripped from numeric strings before parsing
pub const THOUSANDS_SEPARATOR: char = ',';

/// Bound parameters per INSERT statement.
/// SQLite caps them at 32766 since 3.32; rows are chunked to stay under this.
pub const MAX_BIND_PARAMS: usize = 32_000;
