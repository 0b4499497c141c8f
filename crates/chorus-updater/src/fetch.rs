//! Artifact download: stream a remote body to disk with progress
//! reporting.
//!
//! The body is streamed to a sibling `.part` path and renamed into place
//! only after the file is fully written, flushed, and closed. On any
//! failure both the part file and the destination are removed — a download
//! never leaves a truncated artifact behind.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;

use crate::error::{FetchError, Result, UpdateError};
use crate::http;

/// Minimum interval between progress callbacks. The final callback after
/// the last chunk always fires.
const PROGRESS_INTERVAL: Duration = Duration::from_millis(100);

/// A progress snapshot. `total` is 0 when the server sent no
/// `Content-Length`; callers must render an indeterminate indicator then.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadProgress {
    /// Bytes received and written so far.
    pub transferred: u64,
    /// Total bytes expected, or 0 if unknown.
    pub total: u64,
}

impl DownloadProgress {
    /// Progress as a whole percentage, 0 when the total is unknown.
    #[must_use]
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        ((self.transferred.saturating_mul(100)) / self.total).min(100) as u8
    }
}

/// Throttles progress emission to [`PROGRESS_INTERVAL`].
struct ProgressTracker {
    transferred: u64,
    total: u64,
    last_emit: Option<Instant>,
}

impl ProgressTracker {
    fn new(total: u64) -> Self {
        Self {
            transferred: 0,
            total,
            last_emit: None,
        }
    }

    fn advance(&mut self, bytes: u64) {
        self.transferred += bytes;
    }

    fn should_emit(&mut self) -> bool {
        let now = Instant::now();
        match self.last_emit {
            Some(last) if now.duration_since(last) < PROGRESS_INTERVAL => false,
            _ => {
                self.last_emit = Some(now);
                true
            }
        }
    }

    fn snapshot(&self) -> DownloadProgress {
        DownloadProgress {
            transferred: self.transferred,
            total: self.total,
        }
    }
}

/// Seam for the orchestrator: anything that can materialize an artifact at
/// a destination path.
#[allow(async_fn_in_trait)]
pub trait ArtifactFetcher {
    /// Stream `url` to `dest`, invoking `on_progress` as bytes arrive.
    /// Resolves only once the file is fully written and closed.
    async fn fetch<F>(&self, url: &str, dest: &Path, on_progress: F) -> Result<()>
    where
        F: FnMut(DownloadProgress);
}

/// Fetcher backed by a streaming HTTP client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher with the default inactivity timeout.
    pub fn new() -> Result<Self> {
        Self::with_read_timeout(http::DOWNLOAD_READ_TIMEOUT)
    }

    /// Create a fetcher with an explicit per-read inactivity timeout.
    pub fn with_read_timeout(read_timeout: Duration) -> Result<Self> {
        let client = http::download_client(read_timeout).map_err(UpdateError::Download)?;
        Ok(Self { client })
    }

    async fn stream_to_part<F>(
        &self,
        url: &str,
        part: &Path,
        on_progress: &mut F,
    ) -> Result<()>
    where
        F: FnMut(DownloadProgress),
    {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| UpdateError::Download(e.into()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpdateError::Download(FetchError::Status(status.as_u16())));
        }

        let total = response.content_length().unwrap_or(0);
        let mut tracker = ProgressTracker::new(total);
        let mut file = tokio::fs::File::create(part)
            .await
            .map_err(|e| UpdateError::Download(e.into()))?;

        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| UpdateError::Download(e.into()))?;
            file.write_all(&chunk)
                .await
                .map_err(|e| UpdateError::Download(e.into()))?;

            tracker.advance(chunk.len() as u64);
            if tracker.should_emit() {
                on_progress(tracker.snapshot());
            }
        }

        file.flush()
            .await
            .map_err(|e| UpdateError::Download(e.into()))?;
        file.sync_all()
            .await
            .map_err(|e| UpdateError::Download(e.into()))?;
        drop(file);

        on_progress(tracker.snapshot());

        tracing::info!(
            "download complete: {} bytes -> {}",
            tracker.transferred,
            part.display()
        );
        Ok(())
    }
}

impl ArtifactFetcher for HttpFetcher {
    async fn fetch<F>(&self, url: &str, dest: &Path, mut on_progress: F) -> Result<()>
    where
        F: FnMut(DownloadProgress),
    {
        tracing::info!("downloading {} -> {}", url, dest.display());

        // Each attempt starts clean; never resume a stale partial file.
        remove_if_exists(dest).await?;
        let part = part_path(dest);
        remove_if_exists(&part).await?;

        match self.stream_to_part(url, &part, &mut on_progress).await {
            Ok(()) => {
                tokio::fs::rename(&part, dest)
                    .await
                    .map_err(|e| UpdateError::Download(e.into()))?;
                Ok(())
            }
            Err(err) => {
                // No artifact left behind on failure, under any circumstance.
                let _ = tokio::fs::remove_file(&part).await;
                let _ = tokio::fs::remove_file(dest).await;
                Err(err)
            }
        }
    }
}

/// Sibling path the body is streamed to before the final rename.
fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    dest.with_file_name(name)
}

async fn remove_if_exists(path: &Path) -> Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(UpdateError::Download(e.into())),
    }
}
