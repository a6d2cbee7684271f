//! Client side of the same-origin relay
//!
//! The relay is a blind pass-through: its response status is whatever the
//! upstream returned, so completing a round trip is not the same as the
//! upstream request succeeding. Callers must check [`RelayResponse::is_success`]
//! themselves.

use crate::Result;
use reqwest::Client;
use tracing::debug;
use url::Url;

/// Path the relay serves on, relative to its base address.
pub const PROXY_PATH: &str = "/api/proxy";

/// The relayed upstream status plus body.
#[derive(Debug, Clone)]
pub struct RelayResponse<T> {
    /// Upstream HTTP status as relayed
    pub status: u16,
    pub body: T,
}

impl<T> RelayResponse<T> {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Fetches remote resources through the relay endpoint.
pub struct RelayClient {
    client: Client,
    base: Url,
}

impl RelayClient {
    /// Create a client against a relay base address such as
    /// `http://127.0.0.1:9210`.
    ///
    /// No request timeout is configured: a hung upstream stalls the caller,
    /// and cancellation is process teardown.
    pub fn new(base: Url) -> Self {
        Self {
            client: Client::new(),
            base,
        }
    }

    /// Fetch a resource and decode the relayed body as text.
    pub async fn fetch_text(&self, target: &str) -> Result<RelayResponse<String>> {
        let response = self.send(target).await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(RelayResponse { status, body })
    }

    /// Fetch a resource keeping the relayed body as raw bytes.
    ///
    /// The relay labels every body `text/plain`; binary payloads such as
    /// images must come through here to avoid decode corruption.
    pub async fn fetch_bytes(&self, target: &str) -> Result<RelayResponse<Vec<u8>>> {
        let response = self.send(target).await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        Ok(RelayResponse { status, body })
    }

    async fn send(&self, target: &str) -> Result<reqwest::Response> {
        let endpoint = self.base.join(PROXY_PATH)?;
        debug!("Relaying GET {}", target);
        let response = self
            .client
            .get(endpoint)
            .query(&[("url", target)])
            .send()
            .await?;
        Ok(response)
    }
}
