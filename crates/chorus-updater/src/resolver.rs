//! Version resolution: fetch the manifest and decide whether an update
//! applies to the running platform.

use std::time::Duration;

use crate::error::{FetchError, Result, UpdateError};
use crate::http;
use crate::manifest::{Platform, PlatformArtifact, VersionManifest};
use crate::version::Version;

/// Outcome of a version check.
#[derive(Debug, Clone)]
pub enum UpdateCheck {
    /// The running build is current (or the manifest has no entry for this
    /// platform).
    NoUpdate,
    /// A strictly newer build is available for this platform.
    UpdateAvailable {
        /// The published version.
        version: Version,
        /// Where to download it from and what to call the file.
        artifact: PlatformArtifact,
    },
}

/// Seam for the orchestrator: anything that can answer "is there an
/// update for me".
#[allow(async_fn_in_trait)]
pub trait UpdateResolver {
    /// Perform one version check.
    async fn resolve(&self) -> Result<UpdateCheck>;
}

/// Resolver backed by an HTTPS manifest endpoint.
#[derive(Debug, Clone)]
pub struct HttpResolver {
    client: reqwest::Client,
    endpoint: String,
    platform: Platform,
    current_version: Version,
}

impl HttpResolver {
    /// Create a resolver with the default manifest timeout.
    pub fn new(
        endpoint: impl Into<String>,
        platform: Platform,
        current_version: Version,
    ) -> Result<Self> {
        Self::with_timeout(endpoint, platform, current_version, http::MANIFEST_TIMEOUT)
    }

    /// Create a resolver with an explicit whole-exchange timeout.
    pub fn with_timeout(
        endpoint: impl Into<String>,
        platform: Platform,
        current_version: Version,
        timeout: Duration,
    ) -> Result<Self> {
        let client = http::manifest_client(timeout).map_err(UpdateError::ManifestFetch)?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            platform,
            current_version,
        })
    }

    async fn fetch_manifest(&self) -> Result<VersionManifest> {
        tracing::debug!("fetching manifest from {}", self.endpoint);

        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| UpdateError::ManifestFetch(e.into()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpdateError::ManifestFetch(FetchError::Status(
                status.as_u16(),
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| UpdateError::ManifestFetch(e.into()))?;

        serde_json::from_str(&body)
            .map_err(|e| UpdateError::ManifestFetch(FetchError::Malformed(e.to_string())))
    }
}

impl UpdateResolver for HttpResolver {
    async fn resolve(&self) -> Result<UpdateCheck> {
        let manifest = self.fetch_manifest().await?;
        decide(&manifest, self.platform, &self.current_version)
    }
}

/// Apply the update decision rule to a parsed manifest.
///
/// An update is offered iff the manifest version is strictly greater than
/// the running version and the manifest carries an entry for the running
/// platform. A missing platform entry is `NoUpdate`, not an error.
pub fn decide(
    manifest: &VersionManifest,
    platform: Platform,
    current_version: &Version,
) -> Result<UpdateCheck> {
    let published = manifest.parsed_version().map_err(|_| {
        UpdateError::ManifestFetch(FetchError::Malformed(format!(
            "unparseable manifest version {:?}",
            manifest.version
        )))
    })?;

    if !published.is_newer_than(current_version) {
        tracing::info!(
            "no update: current {current_version}, published {published}"
        );
        return Ok(UpdateCheck::NoUpdate);
    }

    let Some(artifact) = manifest.artifact_for(platform) else {
        tracing::info!("update {published} has no artifact for {platform}");
        return Ok(UpdateCheck::NoUpdate);
    };

    tracing::info!(
        "update available: {current_version} -> {published} ({})",
        artifact.filename
    );

    Ok(UpdateCheck::UpdateAvailable {
        version: published,
        artifact: artifact.clone(),
    })
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::testutil::{Canned, TestServer};

    fn v(s: &str) -> Version {
        Version::from_str(s).unwrap()
    }

    fn manifest(json: &str) -> VersionManifest {
        serde_json::from_str(json).unwrap()
    }

    const FULL: &str = r#"{
        "version": "2.1.0",
        "windows": { "url": "http://dl/setup.exe", "filename": "Setup.exe" },
        "linux": { "url": "http://dl/app.AppImage", "filename": "App.AppImage" }
    }"#;

    #[test]
    fn newer_version_is_offered() {
        let check = decide(&manifest(FULL), Platform::Linux, &v("2.0.5")).unwrap();
        match check {
            UpdateCheck::UpdateAvailable { version, artifact } => {
                assert_eq!(version, v("2.1.0"));
                assert_eq!(artifact.filename, "App.AppImage");
            }
            UpdateCheck::NoUpdate => panic!("expected update"),
        }
    }

    #[test]
    fn equal_version_is_no_update() {
        let check = decide(&manifest(FULL), Platform::Linux, &v("2.1.0")).unwrap();
        assert!(matches!(check, UpdateCheck::NoUpdate));
    }

    #[test]
    fn downgrade_is_never_offered() {
        let check = decide(&manifest(FULL), Platform::Linux, &v("3.0.0")).unwrap();
        assert!(matches!(check, UpdateCheck::NoUpdate));
    }

    #[test]
    fn short_arity_comparison() {
        // "2.1" vs running "2.1.0" is equal, not newer.
        let m = manifest(r#"{ "version": "2.1", "linux": { "url": "u", "filename": "f" } }"#);
        let check = decide(&m, Platform::Linux, &v("2.1.0")).unwrap();
        assert!(matches!(check, UpdateCheck::NoUpdate));
    }

    #[test]
    fn missing_platform_is_no_update_not_error() {
        let check = decide(&manifest(FULL), Platform::MacOs, &v("2.0.5")).unwrap();
        assert!(matches!(check, UpdateCheck::NoUpdate));
    }

    #[test]
    fn bad_manifest_version_is_malformed() {
        let m = manifest(r#"{ "version": "latest" }"#);
        let err = decide(&m, Platform::Linux, &v("1.0.0")).unwrap_err();
        assert!(matches!(
            err,
            UpdateError::ManifestFetch(FetchError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn resolves_over_http() {
        let server = TestServer::start(vec![Canned::Ok(FULL.as_bytes().to_vec())]).await;
        let resolver =
            HttpResolver::new(server.url("/version.json"), Platform::Linux, v("2.0.5")).unwrap();

        let check = resolver.resolve().await.unwrap();
        assert!(matches!(check, UpdateCheck::UpdateAvailable { .. }));
        assert_eq!(server.hits(), 1);
    }

    #[tokio::test]
    async fn follows_redirects_to_manifest() {
        let server = TestServer::start(vec![
            Canned::Redirect("/moved".to_string()),
            Canned::Ok(FULL.as_bytes().to_vec()),
        ])
        .await;
        let resolver =
            HttpResolver::new(server.url("/version.json"), Platform::Linux, v("2.0.5")).unwrap();

        let check = resolver.resolve().await.unwrap();
        assert!(matches!(check, UpdateCheck::UpdateAvailable { .. }));
        assert_eq!(server.hits(), 2);
    }

    #[tokio::test]
    async fn redirect_chain_is_bounded() {
        let script = (0..10)
            .map(|i| Canned::Redirect(format!("/hop{i}")))
            .collect();
        let server = TestServer::start(script).await;
        let resolver =
            HttpResolver::new(server.url("/version.json"), Platform::Linux, v("2.0.5")).unwrap();

        let err = resolver.resolve().await.unwrap_err();
        assert!(matches!(
            err,
            UpdateError::ManifestFetch(FetchError::TooManyRedirects)
        ));
        // Initial request plus the five allowed hops, nothing after the bound.
        assert_eq!(server.hits(), 6);
    }

    #[tokio::test]
    async fn non_success_status_is_reported_distinctly() {
        let server = TestServer::start(vec![Canned::Status(503)]).await;
        let resolver =
            HttpResolver::new(server.url("/version.json"), Platform::Linux, v("2.0.5")).unwrap();

        let err = resolver.resolve().await.unwrap_err();
        assert!(matches!(
            err,
            UpdateError::ManifestFetch(FetchError::Status(503))
        ));
    }

    #[tokio::test]
    async fn malformed_body_is_reported_distinctly() {
        let server = TestServer::start(vec![Canned::Ok(b"not json".to_vec())]).await;
        let resolver =
            HttpResolver::new(server.url("/version.json"), Platform::Linux, v("2.0.5")).unwrap();

        let err = resolver.resolve().await.unwrap_err();
        assert!(matches!(
            err,
            UpdateError::ManifestFetch(FetchError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn unresponsive_endpoint_times_out() {
        let server = TestServer::start(vec![Canned::Hang]).await;
        let resolver = HttpResolver::with_timeout(
            server.url("/version.json"),
            Platform::Linux,
            v("2.0.5"),
            Duration::from_millis(200),
        )
        .unwrap();

        let err = resolver.resolve().await.unwrap_err();
        assert!(matches!(
            err,
            UpdateError::ManifestFetch(FetchError::Timeout)
        ));
    }
}
