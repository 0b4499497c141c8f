//! Detached installer launch.
//!
//! The handoff is one-way: the child is spawned detached with null stdio
//! so it survives this process's exit, and the parent never waits on it.
//! Responsibility ends at successful launch confirmation.

use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::{Result, UpdateError};

/// Seam for the orchestrator: anything that can hand execution off to a
/// downloaded artifact.
pub trait InstallLauncher {
    /// Launch the installer at `artifact`, detached from this process.
    fn launch(&self, artifact: &Path) -> Result<()>;
}

/// Launcher that spawns the artifact as a real OS process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessLauncher;

impl InstallLauncher for ProcessLauncher {
    fn launch(&self, artifact: &Path) -> Result<()> {
        tracing::info!("launching installer: {}", artifact.display());
        spawn_detached(artifact)
    }
}

/// Windows: NSIS-style installer, invoked silently, fully detached.
#[cfg(windows)]
fn spawn_detached(artifact: &Path) -> Result<()> {
    use std::os::windows::process::CommandExt;

    const DETACHED_PROCESS: u32 = 0x0000_0008;
    const CREATE_NO_WINDOW: u32 = 0x0800_0000;

    Command::new(artifact)
        .arg("/S")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .creation_flags(DETACHED_PROCESS | CREATE_NO_WINDOW)
        .spawn()
        .map_err(|e| UpdateError::InstallLaunch(format!("spawn failed: {e}")))?;

    Ok(())
}

/// Unix: AppImage-style executable; grant execute permission, then run it
/// directly in its own process group.
#[cfg(unix)]
fn spawn_detached(artifact: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    use std::os::unix::process::CommandExt;

    std::fs::set_permissions(artifact, std::fs::Permissions::from_mode(0o755))
        .map_err(|e| UpdateError::InstallLaunch(format!("chmod failed: {e}")))?;

    Command::new(artifact)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .process_group(0)
        .spawn()
        .map_err(|e| UpdateError::InstallLaunch(format!("spawn failed: {e}")))?;

    Ok(())
}
