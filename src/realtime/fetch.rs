//! Network layer for real-time sources.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::ACCEPT;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{PlenarioError, Result};

/// Fetches a JSON document from a URL.
///
/// The aggregator only depends on this trait so tests can count or stall
/// requests without a network.
#[async_trait]
pub trait JsonFetcher: Send + Sync {
    async fn get_json(&self, url: &str) -> Result<Value>;
}

/// [`JsonFetcher`] over a shared reqwest client.
#[derive(Clone)]
pub struct HttpJsonFetcher {
    http: Client,
}

impl HttpJsonFetcher {
    /// Fetcher whose client gives up after `timeout`.
    pub fn new(timeout: Duration) -> Self {
        Self {
            http: client_with_timeout(timeout),
        }
    }

    /// Reuse an existing client (and its connection pool).
    pub fn with_client(http: Client) -> Self {
        Self { http }
    }
}

/// Shared reqwest client builder for every outbound integration.
///
/// Building only fails when the TLS backend cannot initialise. The default
/// client is used then, and that loss of the timeout is logged.
pub(crate) fn client_with_timeout(timeout: Duration) -> Client {
    Client::builder().timeout(timeout).build().unwrap_or_else(|e| {
        warn!(error = %e, ?timeout, "HTTP client build failed, continuing without a timeout");
        Client::new()
    })
}

#[async_trait]
impl JsonFetcher for HttpJsonFetcher {
    async fn get_json(&self, url: &str) -> Result<Value> {
        let response = self
            .http
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            debug!(url, status = status.as_u16(), "upstream returned non-success");
            return Err(PlenarioError::Api {
                status: status.as_u16(),
                message: format!("GET {url} returned {status}"),
            });
        }
        Ok(response.json().await?)
    }
}
