//! The metrics backend seam and its reachability probe.

use std::fmt::Debug;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

use crate::response::RangeResponse;
use crate::AdapterError;

/// A time-bounded query for one expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeQuery {
    /// The query expression.
    pub expr: String,
    /// Start of the range, unix seconds.
    pub start: i64,
    /// End of the range, unix seconds.
    pub end: i64,
    /// Resolution step in seconds.
    pub step: u64,
}

impl RangeQuery {
    pub fn new(expr: impl Into<String>, start: i64, end: i64, step: u64) -> Self {
        Self {
            expr: expr.into(),
            start,
            end,
            step,
        }
    }
}

/// A backend able to answer range queries.
///
/// Implementations must be cheap to share across concurrent requests.
#[async_trait]
pub trait MetricsBackend: Send + Sync + Debug {
    /// Check that the backend accepts connections, retrying per its policy.
    ///
    /// Never fails: an unreachable backend yields `false`.
    async fn probe(&self) -> bool;

    /// Run one range query.
    ///
    /// Transport failures are returned as errors and are not retried here.
    async fn range_query(&self, query: &RangeQuery) -> Result<RangeResponse, AdapterError>;

    /// A human-readable description of the backend, for logs and errors.
    fn target(&self) -> &str;
}

/// Bounded retry for the reachability probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first.
    pub attempts: u32,
    /// Pause between two attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_secs(5),
        }
    }
}

/// Run `attempt` until it succeeds or the policy is exhausted.
///
/// Attempts are separated by `policy.delay`; there is no pause after the last
/// failure. A policy with zero attempts still tries once.
pub async fn probe_with_retry<F, Fut>(policy: &RetryPolicy, mut attempt: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let attempts = policy.attempts.max(1);
    for n in 1..=attempts {
        if attempt().await {
            debug!(attempt = n, "Probe succeeded");
            return true;
        }
        if n < attempts {
            debug!(attempt = n, delay = ?policy.delay, "Probe failed, retrying");
            tokio::time::sleep(policy.delay).await;
        }
    }
    warn!(attempts, "Probe gave up");
    false
}

/// Try to open and cleanly close a TCP connection to `target`.
///
/// Any error, including running out of `timeout`, counts as "down".
pub async fn is_open(target: &str, timeout: Duration) -> bool {
    match tokio::time::timeout(timeout, TcpStream::connect(target)).await {
        Ok(Ok(mut stream)) => {
            let _ = stream.shutdown().await;
            true
        }
        Ok(Err(e)) => {
            info!(backend = target, error = %e, "Backend refused connection");
            false
        }
        Err(_) => {
            info!(backend = target, ?timeout, "Backend connection timed out");
            false
        }
    }
}
