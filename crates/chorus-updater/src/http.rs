//! Shared HTTP client construction.
//!
//! Both the manifest fetch and the artifact download use the same user
//! agent and the same bounded redirect policy; they differ only in their
//! timeout shape (short whole-exchange budget for the manifest, long
//! inactivity budget for the download).

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::redirect;

use crate::error::FetchError;

/// User agent string for all update traffic.
pub const USER_AGENT_VALUE: &str =
    concat!("chorus-voice/", env!("CARGO_PKG_VERSION"));

/// Maximum redirect hops followed before the exchange fails.
pub const MAX_REDIRECTS: usize = 5;

/// Whole-exchange budget for the manifest fetch (connect + headers + body).
pub const MANIFEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Connect budget for the artifact download.
pub const DOWNLOAD_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Inactivity budget for the artifact download. Applies per read, so a
/// slow-but-steady transfer is never killed.
pub const DOWNLOAD_READ_TIMEOUT: Duration = Duration::from_secs(300);

/// Whole-exchange budget for the connectivity probe.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
    headers
}

/// Redirect policy bounded at [`MAX_REDIRECTS`] hops. Exceeding the bound
/// is a failure, not a silent stop.
fn bounded_redirects() -> redirect::Policy {
    redirect::Policy::custom(|attempt| {
        if attempt.previous().len() > MAX_REDIRECTS {
            attempt.error("too many redirects")
        } else {
            attempt.follow()
        }
    })
}

/// Client for the manifest fetch: one short budget for the whole exchange.
pub fn manifest_client(timeout: Duration) -> Result<reqwest::Client, FetchError> {
    reqwest::Client::builder()
        .default_headers(default_headers())
        .redirect(bounded_redirects())
        .timeout(timeout)
        .build()
        .map_err(|e| FetchError::Network(format!("failed to create HTTP client: {e}")))
}

/// Client for the artifact download: connect budget plus per-read
/// inactivity budget, no total-duration limit.
pub fn download_client(read_timeout: Duration) -> Result<reqwest::Client, FetchError> {
    reqwest::Client::builder()
        .default_headers(default_headers())
        .redirect(bounded_redirects())
        .connect_timeout(DOWNLOAD_CONNECT_TIMEOUT)
        .read_timeout(read_timeout)
        .build()
        .map_err(|e| FetchError::Network(format!("failed to create HTTP client: {e}")))
}

/// Client for the connectivity probe: short budget, no redirect follow
/// needed but harmless.
pub fn probe_client(timeout: Duration) -> Result<reqwest::Client, FetchError> {
    reqwest::Client::builder()
        .default_headers(default_headers())
        .redirect(bounded_redirects())
        .timeout(timeout)
        .build()
        .map_err(|e| FetchError::Network(format!("failed to create HTTP client: {e}")))
}
