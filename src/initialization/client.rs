//! HTTP client initialization.

use std::time::Duration;

use reqwest::ClientBuilder;

/// Initializes the HTTP client used to fetch source pages.
///
/// Creates a `reqwest::Client` configured with:
/// - the configured User-Agent header
/// - a whole-request timeout, reported as `ExtractionError::Timeout` when hit
/// - default redirect following
///
/// # Errors
///
/// Returns a `reqwest::Error` if client creation fails.
pub fn init_client(timeout_seconds: u64, user_agent: &str) -> Result<reqwest::Client, reqwest::Error> {
    ClientBuilder::new()
        .timeout(Duration::from_secs(timeout_seconds))
        .user_agent(user_agent.to_string())
        .build()
}
