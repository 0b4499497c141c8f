//! Lightweight reachability probe.
//!
//! Before the version check, the orchestrator asks whether the update host
//! is reachable at all. Any HTTP response counts as online — the probe
//! answers "is there a route", not "is the service healthy".

use std::time::Duration;

use crate::error::{Result, UpdateError};
use crate::http;

/// Seam for the orchestrator: anything that can answer "are we online".
#[allow(async_fn_in_trait)]
pub trait ConnectivityProbe {
    /// Whether the update host is currently reachable.
    async fn is_online(&self) -> bool;
}

/// Probe backed by a short-timeout GET against a known host.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
    url: String,
}

impl HttpProbe {
    /// Create a probe with the default timeout.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(url, http::PROBE_TIMEOUT)
    }

    /// Create a probe with an explicit timeout.
    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = http::probe_client(timeout)
            .map_err(|e| UpdateError::Connectivity(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl ConnectivityProbe for HttpProbe {
    async fn is_online(&self) -> bool {
        match self.client.get(&self.url).send().await {
            Ok(response) => {
                tracing::debug!("probe reached {} ({})", self.url, response.status());
                true
            }
            Err(err) => {
                tracing::warn!("probe failed for {}: {err}", self.url);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{Canned, TestServer};

    #[tokio::test]
    async fn any_response_counts_as_online() {
        let server = TestServer::start(vec![Canned::Status(503)]).await;
        let probe = HttpProbe::new(server.url("/")).unwrap();
        assert!(probe.is_online().await);
    }

    #[tokio::test]
    async fn refused_connection_is_offline() {
        // Bind then drop to get a port with no listener.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let probe = HttpProbe::new(format!("http://{addr}/")).unwrap();
        assert!(!probe.is_online().await);
    }

    #[tokio::test]
    async fn unresponsive_host_is_offline() {
        let server = TestServer::start(vec![Canned::Hang]).await;
        let probe =
            HttpProbe::with_timeout(server.url("/"), Duration::from_millis(200)).unwrap();
        assert!(!probe.is_online().await);
    }
}
