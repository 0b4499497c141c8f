//! Status sinks for the launcher process.
//!
//! The splash window is a separate surface fed over an IPC boundary; the
//! launcher renders status events either as log lines or as JSON lines on
//! stdout for the splash process to consume. Both are fire-and-forget: a
//! failed write is ignored, never propagated into the update flow.

use std::io::Write;

use chorus_updater::{StatusSink, UpdateStatus};

/// Renders status events as tracing log lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl StatusSink for LogSink {
    fn emit(&self, status: UpdateStatus) {
        match &status {
            UpdateStatus::Available { version } => {
                tracing::info!(status = status.tag(), %version, "update status");
            }
            UpdateStatus::Downloading {
                percent,
                transferred,
                total,
            } => {
                tracing::info!(
                    status = status.tag(),
                    percent,
                    transferred,
                    total,
                    "update status"
                );
            }
            UpdateStatus::Error { message } => {
                tracing::warn!(status = status.tag(), %message, "update status");
            }
            _ => {
                tracing::info!(status = status.tag(), "update status");
            }
        }
    }
}

/// Writes each status event as one JSON line on stdout, for the splash
/// surface to consume.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLineSink;

impl StatusSink for JsonLineSink {
    fn emit(&self, status: UpdateStatus) {
        if let Ok(line) = serde_json::to_string(&status) {
            // Best-effort: the consumer may already be gone.
            let mut stdout = std::io::stdout().lock();
            let _ = writeln!(stdout, "{line}");
            let _ = stdout.flush();
        }
    }
}

/// Fan-out to both sinks, so JSON mode still leaves a log trail.
#[derive(Debug, Clone, Copy, Default)]
pub struct TeeSink;

impl StatusSink for TeeSink {
    fn emit(&self, status: UpdateStatus) {
        LogSink.emit(status.clone());
        JsonLineSink.emit(status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sinks_never_panic() {
        let statuses = [
            UpdateStatus::Checking,
            UpdateStatus::Available {
                version: "2.1.0".to_string(),
            },
            UpdateStatus::Downloading {
                percent: 50,
                transferred: 500,
                total: 1000,
            },
            UpdateStatus::Error {
                message: "boom".to_string(),
            },
        ];
        for status in statuses {
            LogSink.emit(status.clone());
            JsonLineSink.emit(status);
        }
    }
}
