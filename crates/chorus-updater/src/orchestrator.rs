//! The update orchestrator: sequences connectivity probe, version check,
//! download, and installer handoff, reporting every transition to a
//! status sink.
//!
//! Failure policy is fail open: every error in the flow converts to the
//! `error` status and a fallback to the main application. The only state
//! that prevents reaching a usable application is `NoInternet` — without
//! connectivity the application's core functionality is unusable anyway,
//! so the flow halts there instead of falling through.
//!
//! There is no retry loop. Every failure transitions forward; a manual
//! re-check is just the host invoking [`Orchestrator::run`] again, which
//! starts a fresh session.

use std::path::PathBuf;
use std::time::Duration;

use crate::checksum;
use crate::connectivity::ConnectivityProbe;
use crate::error::{FetchError, UpdateError};
use crate::fetch::ArtifactFetcher;
use crate::install::InstallLauncher;
use crate::manifest::PlatformArtifact;
use crate::resolver::{UpdateCheck, UpdateResolver};
use crate::status::{StatusSink, UpdateStatus};
use crate::version::Version;

/// A named state in the update/startup state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Nothing has happened yet.
    #[default]
    Idle,
    /// Probing reachability of the update host.
    CheckingConnectivity,
    /// Fetching and evaluating the version manifest.
    CheckingVersion,
    /// The running build is current.
    NoUpdateFound,
    /// A newer build was found for this platform.
    UpdateFound,
    /// Streaming the artifact to the temp directory.
    Downloading,
    /// Artifact fully written and verified.
    Downloaded,
    /// Handing off to the detached installer process.
    LaunchingInstaller,
    /// Handing off to the main application (normal or degraded path).
    LaunchingMainApplication,
    /// Terminal: the update host is unreachable.
    NoInternet,
    /// The flow failed; falling back to the current build.
    Error,
    /// Terminal: process exit scheduled after the installer handoff.
    Exiting,
}

/// What the host process should do once the flow finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Create the main application window; the current build stays in use.
    LaunchMainApplication,
    /// The installer was launched; exit this process.
    ExitForUpdate,
    /// No connectivity; stall with the splash message, no automatic
    /// recovery.
    Halt,
}

/// Tunables for the orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Whether this is a distributed build. Unpackaged/dev builds never
    /// enter the version check.
    pub packaged: bool,

    /// Whether to probe connectivity before the version check.
    pub probe_connectivity: bool,

    /// Directory the artifact is downloaded into.
    pub download_dir: PathBuf,

    /// Cosmetic delay before handing off when no update was found.
    pub no_update_delay: Duration,

    /// Cosmetic delay before handing off after a failure, long enough for
    /// the user to read the message.
    pub error_delay: Duration,

    /// Grace delay between the detached installer spawn and process exit,
    /// so the spawn completes before the parent disappears. A
    /// race-avoidance heuristic, not a synchronization guarantee.
    pub exit_grace: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            packaged: false,
            probe_connectivity: true,
            download_dir: std::env::temp_dir(),
            no_update_delay: Duration::from_millis(500),
            error_delay: Duration::from_secs(2),
            exit_grace: Duration::from_secs(2),
        }
    }
}

/// The orchestrator's own state, alive for one invocation of
/// [`Orchestrator::run`].
#[derive(Debug, Default)]
pub struct UpdateSession {
    /// Current phase.
    pub phase: Phase,
    /// The resolved artifact, once the version check found an update.
    pub artifact: Option<PlatformArtifact>,
    /// The version the artifact upgrades to.
    pub update_version: Option<Version>,
    /// The last error, if the flow failed.
    pub last_error: Option<UpdateError>,
}

/// Drives the startup update flow over pluggable seams.
pub struct Orchestrator<R, F, P, L, S> {
    config: OrchestratorConfig,
    resolver: R,
    fetcher: F,
    probe: P,
    launcher: L,
    sink: S,
    session: UpdateSession,
}

impl<R, F, P, L, S> Orchestrator<R, F, P, L, S>
where
    R: UpdateResolver,
    F: ArtifactFetcher,
    P: ConnectivityProbe,
    L: InstallLauncher,
    S: StatusSink,
{
    /// Assemble an orchestrator from its collaborators.
    pub fn new(
        config: OrchestratorConfig,
        resolver: R,
        fetcher: F,
        probe: P,
        launcher: L,
        sink: S,
    ) -> Self {
        Self {
            config,
            resolver,
            fetcher,
            probe,
            launcher,
            sink,
            session: UpdateSession::default(),
        }
    }

    /// The current session state.
    pub fn session(&self) -> &UpdateSession {
        &self.session
    }

    /// Run the flow once, from `Idle` to a terminal outcome.
    ///
    /// May be invoked again later (e.g. a user-triggered re-check); each
    /// invocation starts a fresh session.
    pub async fn run(&mut self) -> Outcome {
        self.session = UpdateSession::default();

        if !self.config.packaged {
            tracing::info!("unpackaged build, skipping update check");
            return self.no_update_found().await;
        }

        if self.config.probe_connectivity {
            self.transition(Phase::CheckingConnectivity);
            self.sink.emit(UpdateStatus::CheckingConnection);

            if !self.probe.is_online().await {
                self.transition(Phase::NoInternet);
                self.sink.emit(UpdateStatus::NoInternet);
                return Outcome::Halt;
            }
        }

        self.transition(Phase::CheckingVersion);
        self.sink.emit(UpdateStatus::Checking);

        let check = match self.resolver.resolve().await {
            Ok(check) => check,
            Err(err) => return self.fall_back(err).await,
        };

        let (version, artifact) = match check {
            UpdateCheck::NoUpdate => return self.no_update_found().await,
            UpdateCheck::UpdateAvailable { version, artifact } => (version, artifact),
        };

        self.transition(Phase::UpdateFound);
        self.sink.emit(UpdateStatus::Available {
            version: version.to_string(),
        });
        self.session.update_version = Some(version);
        self.session.artifact = Some(artifact.clone());

        self.transition(Phase::Downloading);
        self.sink.emit(UpdateStatus::Downloading {
            percent: 0,
            transferred: 0,
            total: 0,
        });

        let dest = self.config.download_dir.join(&artifact.filename);
        let fetched = {
            let sink = &self.sink;
            self.fetcher
                .fetch(&artifact.url, &dest, |progress| {
                    sink.emit(UpdateStatus::Downloading {
                        percent: progress.percent(),
                        transferred: progress.transferred,
                        total: progress.total,
                    });
                })
                .await
        };
        if let Err(err) = fetched {
            return self.fall_back(err).await;
        }

        if let Err(err) = self.verify_artifact(&artifact, &dest).await {
            let _ = tokio::fs::remove_file(&dest).await;
            return self.fall_back(err).await;
        }

        self.transition(Phase::Downloaded);
        self.sink.emit(UpdateStatus::Downloaded);

        self.transition(Phase::LaunchingInstaller);
        if let Err(err) = self.launcher.launch(&dest) {
            return self.fall_back(err).await;
        }

        tokio::time::sleep(self.config.exit_grace).await;
        self.transition(Phase::Exiting);
        tracing::info!("exiting for update");
        Outcome::ExitForUpdate
    }

    /// Verify the download against the manifest checksum, when one is
    /// declared. Legacy manifests carry none; that is logged and allowed.
    async fn verify_artifact(
        &self,
        artifact: &PlatformArtifact,
        dest: &std::path::Path,
    ) -> Result<(), UpdateError> {
        let Some(expected) = artifact.sha256.clone() else {
            tracing::warn!(
                "manifest declares no checksum for {}; skipping verification",
                artifact.filename
            );
            return Ok(());
        };

        let path = dest.to_path_buf();
        tokio::task::spawn_blocking(move || checksum::verify_file_sha256(&path, &expected))
            .await
            .map_err(|e| UpdateError::Download(FetchError::Io(e.to_string())))?
    }

    async fn no_update_found(&mut self) -> Outcome {
        self.transition(Phase::NoUpdateFound);
        self.sink.emit(UpdateStatus::NotAvailable);
        tokio::time::sleep(self.config.no_update_delay).await;
        self.launch_main()
    }

    /// Fail-open path: report the error, pause so the message is visible,
    /// then hand off to the current build.
    async fn fall_back(&mut self, err: UpdateError) -> Outcome {
        tracing::warn!("update flow failed: {err}");
        self.transition(Phase::Error);
        self.sink.emit(UpdateStatus::Error {
            message: err.user_message().to_string(),
        });
        self.session.last_error = Some(err);
        tokio::time::sleep(self.config.error_delay).await;
        self.launch_main()
    }

    fn launch_main(&mut self) -> Outcome {
        self.transition(Phase::LaunchingMainApplication);
        self.sink.emit(UpdateStatus::Loading);
        Outcome::LaunchMainApplication
    }

    fn transition(&mut self, phase: Phase) {
        tracing::debug!("phase {:?} -> {:?}", self.session.phase, phase);
        self.session.phase = phase;
    }
}
