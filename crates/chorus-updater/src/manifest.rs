//! Version manifest data model.
//!
//! The manifest is a small JSON document served over HTTPS describing the
//! latest available build and a download location per platform:
//!
//! ```json
//! {
//!   "version": "2.1.0",
//!   "windows": { "url": "https://...", "filename": "ChorusVoice-Setup.exe" },
//!   "linux":   { "url": "https://...", "filename": "ChorusVoice.AppImage" }
//! }
//! ```
//!
//! A manifest may legitimately omit a platform; that is not an error, it
//! just means no update is offered there.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::version::Version;

/// Identifier for the running platform, matching manifest keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Windows (NSIS-style installer, invoked with `/S`).
    Windows,
    /// Linux (AppImage, chmod +x then run directly).
    Linux,
    /// macOS.
    MacOs,
}

impl Platform {
    /// Detect the platform this process is running on.
    ///
    /// Returns `None` on operating systems the updater does not distribute
    /// builds for.
    #[must_use]
    pub fn current() -> Option<Self> {
        match std::env::consts::OS {
            "windows" => Some(Self::Windows),
            "linux" => Some(Self::Linux),
            "macos" => Some(Self::MacOs),
            _ => None,
        }
    }

    /// The key under which this platform appears in the manifest.
    #[must_use]
    pub const fn manifest_key(self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::Linux => "linux",
            Self::MacOs => "macos",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.manifest_key())
    }
}

/// A downloadable artifact for one platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformArtifact {
    /// Download URL for the installer or executable.
    pub url: String,

    /// File name to store the artifact under in the temp directory.
    pub filename: String,

    /// Optional SHA256 hex digest of the artifact.
    ///
    /// Legacy manifests omit this; when present the download is verified
    /// before the installer is launched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

/// The remote document describing the latest available build.
///
/// Owned by the resolver call that produced it and discarded once the
/// relevant [`PlatformArtifact`] has been extracted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionManifest {
    /// The latest available version, as published.
    pub version: String,

    /// Per-platform download entries, keyed by platform identifier.
    #[serde(flatten)]
    pub platforms: BTreeMap<String, PlatformArtifact>,
}

impl VersionManifest {
    /// Parse the published version string.
    pub fn parsed_version(&self) -> Result<Version> {
        Version::from_str(&self.version)
    }

    /// Look up the artifact entry for a platform, if the manifest has one.
    #[must_use]
    pub fn artifact_for(&self, platform: Platform) -> Option<&PlatformArtifact> {
        self.platforms.get(platform.manifest_key())
    }
}
