//! Chorus Voice startup launcher.
//!
//! Runs the self-update flow before the main application window exists:
//! acquires the single-instance lock, drives the update orchestrator, and
//! maps its outcome to an exit code. The splash/GUI surface is an external
//! collaborator that observes the flow through the status sink.

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Context;
use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};

use chorus_updater::{
    HttpFetcher, HttpProbe, HttpResolver, Orchestrator, OrchestratorConfig, Outcome, Platform,
    ProcessLauncher, StatusSink, Version,
};

mod logging;
mod single_instance;
mod sink;

use crate::single_instance::InstanceLock;

/// Default manifest endpoint.
const DEFAULT_MANIFEST_URL: &str = "https://downloads.chorusvoice.app/version.json";

#[derive(Debug, Parser)]
#[command(name = "chorus-launcher", version, about = "Chorus Voice startup launcher")]
struct Cli {
    /// Check for updates even in an unpackaged build.
    #[arg(long)]
    check_updates: bool,

    /// Version manifest endpoint to poll.
    #[arg(long, env = "CHORUS_MANIFEST_URL", default_value = DEFAULT_MANIFEST_URL)]
    manifest_url: String,

    /// Skip the connectivity probe before the version check.
    #[arg(long)]
    no_connectivity_check: bool,

    /// Emit status events as JSON lines on stdout for the splash surface.
    #[arg(long)]
    status_json: bool,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

fn main() {
    let cli = Cli::parse();

    let data_dir = data_dir();
    let log_config = logging::LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        log_file: data_dir.as_ref().map(|dir| dir.join("chorus.log")),
    };
    if let Err(error) = logging::init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }

    tracing::info!("launcher starting, version {}", chorus_updater::VERSION);

    // Single-instance coordination: on contention, exit 0 immediately
    // without running any update or UI logic. Focusing the existing main
    // window is the GUI collaborator's job, not ours.
    let _lock = match &data_dir {
        Some(dir) => match InstanceLock::acquire(&dir.join("chorus.lock")) {
            Ok(Some(lock)) => Some(lock),
            Ok(None) => {
                tracing::info!("another instance is already running, exiting");
                std::process::exit(0);
            }
            Err(error) => {
                tracing::warn!("could not acquire instance lock: {error}");
                None
            }
        },
        None => None,
    };

    let exit_code = match run(&cli) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: &Cli) -> anyhow::Result<i32> {
    let Some(platform) = Platform::current() else {
        tracing::warn!("no distributed builds for this platform, skipping update check");
        return Ok(0);
    };

    let current_version =
        Version::from_str(chorus_updater::VERSION).context("invalid build version")?;

    let resolver = HttpResolver::new(&cli.manifest_url, platform, current_version)
        .context("failed to set up version resolver")?;
    let fetcher = HttpFetcher::new().context("failed to set up artifact fetcher")?;
    let probe = HttpProbe::new(&cli.manifest_url).context("failed to set up connectivity probe")?;

    let config = OrchestratorConfig {
        // Distributed builds always check; dev builds only on request.
        packaged: cli.check_updates || !cfg!(debug_assertions),
        probe_connectivity: !cli.no_connectivity_check,
        ..Default::default()
    };

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    let exit_code = if cli.status_json {
        runtime.block_on(drive(config, resolver, fetcher, probe, sink::TeeSink))
    } else {
        runtime.block_on(drive(config, resolver, fetcher, probe, sink::LogSink))
    };

    Ok(exit_code)
}

async fn drive<S: StatusSink>(
    config: OrchestratorConfig,
    resolver: HttpResolver,
    fetcher: HttpFetcher,
    probe: HttpProbe,
    sink: S,
) -> i32 {
    let mut orchestrator =
        Orchestrator::new(config, resolver, fetcher, probe, ProcessLauncher, sink);

    match orchestrator.run().await {
        Outcome::LaunchMainApplication => {
            // The GUI collaborator takes over from here; the engine's job
            // is done.
            tracing::info!("handing off to the main application");
            0
        }
        Outcome::ExitForUpdate => {
            tracing::info!("installer launched, exiting for update");
            0
        }
        Outcome::Halt => {
            tracing::error!("update host unreachable; check the internet connection and restart");
            0
        }
    }
}

/// Per-user data directory for the log file and instance lock.
fn data_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join("ChorusVoice"))
}
