//! Self-update engine for Chorus Voice.
//!
//! Before the main application window exists, the launcher runs this
//! engine: it polls a version manifest over HTTPS, decides whether a newer
//! build applies to the running platform, streams the installer to the
//! temp directory with progress reporting, and hands execution off to a
//! detached installer process. A splash UI observes the whole flow through
//! a [`StatusSink`] and is otherwise decoupled from it.
//!
//! # Architecture
//!
//! Three cooperating pieces, driven top-down by the orchestrator:
//!
//! - [`resolver`] fetches the manifest and applies the update decision
//!   rule (strictly-newer versions only; a manifest without an entry for
//!   the running platform means no update, not an error).
//! - [`fetch`] streams the artifact to disk with throttled progress,
//!   bounded redirects, and an inactivity (not total-duration) timeout. A
//!   failed download never leaves a partial file behind.
//! - [`orchestrator`] sequences probe → check → download → install and
//!   defines the fallback on every failure edge. The policy is fail open:
//!   update problems never keep the user from the current build.
//!
//! # Example
//!
//! ```no_run
//! use chorus_updater::{
//!     HttpFetcher, HttpProbe, HttpResolver, NoopSink, Orchestrator,
//!     OrchestratorConfig, Platform, ProcessLauncher, Version,
//! };
//! use std::str::FromStr;
//!
//! # async fn run() -> chorus_updater::Result<()> {
//! let resolver = HttpResolver::new(
//!     "https://downloads.chorusvoice.app/version.json",
//!     Platform::current().expect("unsupported platform"),
//!     Version::from_str(chorus_updater::VERSION)?,
//! )?;
//! let mut orchestrator = Orchestrator::new(
//!     OrchestratorConfig { packaged: true, ..Default::default() },
//!     resolver,
//!     HttpFetcher::new()?,
//!     HttpProbe::new("https://downloads.chorusvoice.app/")?,
//!     ProcessLauncher,
//!     NoopSink,
//! );
//! let outcome = orchestrator.run().await;
//! # let _ = outcome;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod checksum;
pub mod connectivity;
pub mod error;
pub mod fetch;
pub mod http;
pub mod install;
pub mod manifest;
pub mod orchestrator;
pub mod resolver;
pub mod status;
pub mod version;

#[cfg(test)]
mod testutil;

pub use connectivity::{ConnectivityProbe, HttpProbe};
pub use error::{FetchError, Result, UpdateError};
pub use fetch::{ArtifactFetcher, DownloadProgress, HttpFetcher};
pub use install::{InstallLauncher, ProcessLauncher};
pub use manifest::{Platform, PlatformArtifact, VersionManifest};
pub use orchestrator::{Orchestrator, OrchestratorConfig, Outcome, Phase, UpdateSession};
pub use resolver::{HttpResolver, UpdateCheck, UpdateResolver};
pub use status::{NoopSink, StatusSink, UpdateStatus};
pub use version::Version;

/// Version of the running build.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
