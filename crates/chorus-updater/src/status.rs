//! Status events for the splash surface.
//!
//! The orchestrator reports every phase transition through a
//! [`StatusSink`]. Emission is fire-and-forget: a sink must never block
//! the flow and never fail it, even if the surface behind it is gone.

use serde::Serialize;

/// A status event rendered by the splash UI.
///
/// Serializes with kebab-case tags so the payload can be forwarded
/// verbatim over an IPC boundary to a web-based splash screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum UpdateStatus {
    /// Probing whether the update host is reachable.
    CheckingConnection,
    /// The update host is unreachable; the flow halts here.
    NoInternet,
    /// Fetching the version manifest.
    Checking,
    /// A newer build was found.
    Available {
        /// The published version string.
        version: String,
    },
    /// Artifact transfer in progress.
    Downloading {
        /// Whole percentage, 0 when the total is unknown.
        percent: u8,
        /// Bytes received so far.
        transferred: u64,
        /// Total bytes expected, or 0 if unknown.
        total: u64,
    },
    /// Artifact fully written and verified.
    Downloaded,
    /// The update flow failed; falling back to the current build.
    Error {
        /// User-facing description of what went wrong.
        message: String,
    },
    /// The running build is current.
    NotAvailable,
    /// Handing off to the main application window.
    Loading,
}

impl UpdateStatus {
    /// The kebab-case tag, for log lines.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::CheckingConnection => "checking-connection",
            Self::NoInternet => "no-internet",
            Self::Checking => "checking",
            Self::Available { .. } => "available",
            Self::Downloading { .. } => "downloading",
            Self::Downloaded => "downloaded",
            Self::Error { .. } => "error",
            Self::NotAvailable => "not-available",
            Self::Loading => "loading",
        }
    }
}

/// External observer of the update flow (the splash UI).
pub trait StatusSink {
    /// Render one status event. Must not block.
    fn emit(&self, status: UpdateStatus);
}

/// Sink that drops every event. Useful for headless runs and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl StatusSink for NoopSink {
    fn emit(&self, _status: UpdateStatus) {}
}
