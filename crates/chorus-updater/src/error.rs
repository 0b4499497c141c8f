//! Error types for the update engine.

use thiserror::Error;

/// Transport-level failure shared by the manifest fetch and the artifact
/// download. Each case is distinct so callers can report them separately.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FetchError {
    /// Terminal response with a non-success status code.
    #[error("unexpected HTTP status {0}")]
    Status(u16),

    /// The redirect chain exceeded the allowed hop count.
    #[error("too many redirects")]
    TooManyRedirects,

    /// The exchange exceeded its time budget.
    #[error("timed out")]
    Timeout,

    /// The response body could not be parsed.
    #[error("malformed response body: {0}")]
    Malformed(String),

    /// Connection-level failure.
    #[error("network error: {0}")]
    Network(String),

    /// Local I/O failure while writing the artifact.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_redirect() {
            Self::TooManyRedirects
        } else if err.is_decode() {
            Self::Malformed(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<std::io::Error> for FetchError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::TimedOut {
            Self::Timeout
        } else {
            Self::Io(err.to_string())
        }
    }
}

/// Errors that can occur during the update flow.
///
/// All of these are caught at the orchestrator boundary and converted into
/// the `error` status plus a fallback to the main application; none of them
/// terminate the process.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum UpdateError {
    /// The connectivity probe could not reach the update host.
    #[error("no connectivity: {0}")]
    Connectivity(String),

    /// The version manifest could not be retrieved or parsed.
    #[error("manifest fetch failed: {0}")]
    ManifestFetch(#[source] FetchError),

    /// A version string could not be parsed.
    #[error("invalid version format: {0}")]
    InvalidVersion(String),

    /// The artifact download failed mid-transfer.
    #[error("download failed: {0}")]
    Download(#[source] FetchError),

    /// The downloaded artifact did not match its declared checksum.
    #[error("checksum verification failed: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// Expected SHA256 hash from the manifest.
        expected: String,
        /// Actual SHA256 hash of the downloaded file.
        actual: String,
    },

    /// The installer process could not be launched.
    #[error("installer launch failed: {0}")]
    InstallLaunch(String),
}

impl UpdateError {
    /// Returns a user-friendly message suitable for the splash surface.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Connectivity(_) => "No internet connection.",
            Self::ManifestFetch(_) => "Could not check for updates.",
            Self::Download(_) => "Could not download the update.",
            Self::ChecksumMismatch { .. } => {
                "The downloaded update failed verification and was discarded."
            }
            Self::InstallLaunch(_) => "Could not start the installer.",
            Self::InvalidVersion(_) => "An unexpected error occurred.",
        }
    }
}

/// Result type alias for update operations.
pub type Result<T> = std::result::Result<T, UpdateError>;
