//! Source document loading.
//!
//! HTML pages come from HTTP(S) or from disk. CSV sources are read by the
//! CSV extractor directly and never pass through here.

use std::path::Path;

use log::{debug, info};

use crate::error_handling::ExtractionError;

/// Browser-like request headers sent with every page fetch.
fn apply_request_headers(builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    builder
        .header(
            reqwest::header::ACCEPT,
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        )
        .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
}

/// Fetches a page body.
///
/// The client carries the timeout and user agent (see `init_client`).
///
/// # Errors
///
/// - `Timeout` when the request exceeds the client's deadline
/// - `Fetch` for connection failures and non-success statuses
pub async fn fetch_html(client: &reqwest::Client, url: &str) -> Result<String, ExtractionError> {
    let map_err = |source: reqwest::Error| {
        if source.is_timeout() {
            ExtractionError::Timeout {
                url: url.to_string(),
            }
        } else {
            ExtractionError::Fetch {
                url: url.to_string(),
                source,
            }
        }
    };

    let response = apply_request_headers(client.get(url))
        .send()
        .await
        .map_err(map_err)?
        .error_for_status()
        .map_err(map_err)?;
    debug!("GET {url} -> {}", response.status());

    let body = response.text().await.map_err(map_err)?;
    info!("Fetched {} bytes from {url}", body.len());
    Ok(body)
}

/// Reads a saved HTML page.
pub fn read_html_file(path: &Path) -> Result<String, ExtractionError> {
    std::fs::read_to_string(path).map_err(|source| ExtractionError::Io {
        path: path.to_path_buf(),
        source,
    })
}
