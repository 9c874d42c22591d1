//! Prometheus adapter using the HTTP query API.
//!
//! This adapter runs range queries against `/api/v1/query_range` and probes
//! the server's TCP port before a batch of queries is issued.
//!
//! ## Example
//!
//! ```rust,no_run
//! use promportal_adapters::prometheus::PrometheusClient;
//! use promportal_adapters::{MetricsBackend, RangeQuery};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = PrometheusClient::builder()
//!         .hostname("localhost")
//!         .port(9090)
//!         .build()?;
//!
//!     if client.probe().await {
//!         let query = RangeQuery::new(r#"up{job="node"}"#, 1700000000, 1700003600, 60);
//!         let response = client.range_query(&query).await?;
//!         println!("Top value: {:?}", response.top_value());
//!     }
//!
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::backend::{is_open, probe_with_retry, MetricsBackend, RangeQuery, RetryPolicy};
use crate::response::RangeResponse;
use crate::AdapterError;

/// Path of the range query endpoint.
pub const QUERY_RANGE_PATH: &str = "/api/v1/query_range";

/// Prometheus client for range queries.
#[derive(Debug, Clone)]
pub struct PrometheusClient {
    client: Client,
    scheme: String,
    target: String,
    probe_address: String,
    probe_timeout: Duration,
    retry: RetryPolicy,
}

impl PrometheusClient {
    /// Create a new builder for configuring the client.
    pub fn builder() -> PrometheusClientBuilder {
        PrometheusClientBuilder::default()
    }

    /// The full URL of the range query endpoint.
    pub fn query_range_url(&self) -> String {
        format!("{}://{}{}", self.scheme, self.target, QUERY_RANGE_PATH)
    }
}

#[async_trait]
impl MetricsBackend for PrometheusClient {
    async fn probe(&self) -> bool {
        probe_with_retry(&self.retry, || is_open(&self.probe_address, self.probe_timeout)).await
    }

    async fn range_query(&self, query: &RangeQuery) -> Result<RangeResponse, AdapterError> {
        debug!(
            query = %query.expr,
            start = query.start,
            end = query.end,
            step = query.step,
            "Range query"
        );

        let params = [
            ("query", query.expr.clone()),
            ("start", query.start.to_string()),
            ("end", query.end.to_string()),
            ("step", query.step.to_string()),
        ];

        let response = self
            .client
            .post(self.query_range_url())
            .form(&params)
            .send()
            .await?;

        // Bad queries come back as 4xx with a JSON error body.
        let status = response.status();
        let body = response.bytes().await?;

        match serde_json::from_slice::<RangeResponse>(&body) {
            Ok(parsed) => Ok(parsed),
            Err(_) if !status.is_success() => Err(AdapterError::Http(format!(
                "API returned status {}",
                status
            ))),
            Err(e) => Err(e.into()),
        }
    }

    fn target(&self) -> &str {
        &self.target
    }
}

/// Builder for PrometheusClient.
#[derive(Debug, Default)]
pub struct PrometheusClientBuilder {
    hostname: Option<String>,
    port: Option<u16>,
    scheme: Option<String>,
    timeout: Option<Duration>,
    probe_timeout: Option<Duration>,
    retry: Option<RetryPolicy>,
}

impl PrometheusClientBuilder {
    /// Set the server hostname (default: "localhost").
    pub fn hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    /// Set the server port. Without a port the hostname is used as-is.
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set an optional server port.
    pub fn maybe_port(mut self, port: Option<u16>) -> Self {
        self.port = port;
        self
    }

    /// Set the URL scheme (default: "http").
    pub fn scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = Some(scheme.into());
        self
    }

    /// Set the per-query timeout (default: 60 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the timeout of one probe connection attempt (default: 3 seconds).
    pub fn probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = Some(timeout);
        self
    }

    /// Set the probe retry policy (default: 3 attempts, 5 seconds apart).
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<PrometheusClient, AdapterError> {
        let timeout = self.timeout.unwrap_or(Duration::from_secs(60));
        let hostname = self.hostname.unwrap_or_else(|| "localhost".to_string());
        if hostname.is_empty() {
            return Err(AdapterError::Config("hostname is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AdapterError::Config(e.to_string()))?;

        let scheme = self.scheme.unwrap_or_else(|| "http".to_string());
        Ok(PrometheusClient {
            client,
            target: target(&hostname, self.port),
            probe_address: probe_address(&hostname, self.port, &scheme),
            scheme,
            probe_timeout: self.probe_timeout.unwrap_or(Duration::from_secs(3)),
            retry: self.retry.unwrap_or_default(),
        })
    }
}

/// `host:port` when a port is given, the bare hostname otherwise.
pub fn target(hostname: &str, port: Option<u16>) -> String {
    match port {
        Some(port) => format!("{}:{}", hostname, port),
        None => hostname.to_string(),
    }
}

/// The `host:port` the probe connects to. Without a port, the default
/// port of the scheme is used, as it is for queries.
pub fn probe_address(hostname: &str, port: Option<u16>, scheme: &str) -> String {
    let port = port.unwrap_or(if scheme.eq_ignore_ascii_case("https") {
        443
    } else {
        80
    });
    format!("{}:{}", hostname, port)
}
