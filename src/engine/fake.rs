//! In-memory metrics backend for engine and registry tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use promportal_adapters::{AdapterError, MetricsBackend, RangeQuery, RangeResponse};

#[derive(Debug, Clone)]
enum Answer {
    Body(String, Duration),
    Fail,
}

/// Answers range queries from canned bodies keyed by expression.
///
/// Unknown expressions get an empty matrix.
#[derive(Debug, Default)]
pub(crate) struct FakeBackend {
    up: bool,
    answers: HashMap<String, Answer>,
    probes: AtomicU32,
    queries: Mutex<Vec<RangeQuery>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeBackend {
    pub fn up() -> Self {
        Self {
            up: true,
            ..Default::default()
        }
    }

    pub fn down() -> Self {
        Self::default()
    }

    /// Answer `expr` with one series.
    pub fn series(self, expr: &str, values: &[(i64, &str)]) -> Self {
        self.series_after(expr, values, Duration::ZERO)
    }

    /// Answer `expr` with one series after a delay.
    pub fn series_after(mut self, expr: &str, values: &[(i64, &str)], delay: Duration) -> Self {
        self.answers
            .insert(expr.to_string(), Answer::Body(matrix(&[values]), delay));
        self
    }

    /// Answer `expr` with several series.
    pub fn multi_series(mut self, expr: &str, series: &[&[(i64, &str)]]) -> Self {
        self.answers
            .insert(expr.to_string(), Answer::Body(matrix(series), Duration::ZERO));
        self
    }

    /// Answer `expr` with a raw body.
    pub fn body(mut self, expr: &str, body: &str) -> Self {
        self.answers
            .insert(expr.to_string(), Answer::Body(body.to_string(), Duration::ZERO));
        self
    }

    /// Fail `expr` at the transport level.
    pub fn failing(mut self, expr: &str) -> Self {
        self.answers.insert(expr.to_string(), Answer::Fail);
        self
    }

    pub fn probes(&self) -> u32 {
        self.probes.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<RangeQuery> {
        self.queries.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

fn matrix(series: &[&[(i64, &str)]]) -> String {
    let result: Vec<_> = series
        .iter()
        .enumerate()
        .map(|(i, values)| {
            let values: Vec<_> = values.iter().map(|(ts, v)| json!([ts, v])).collect();
            json!({ "metric": { "series": i.to_string() }, "values": values })
        })
        .collect();

    json!({
        "status": "success",
        "data": { "resultType": "matrix", "result": result }
    })
    .to_string()
}

#[async_trait]
impl MetricsBackend for FakeBackend {
    async fn probe(&self) -> bool {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.up
    }

    async fn range_query(&self, query: &RangeQuery) -> Result<RangeResponse, AdapterError> {
        self.queries.lock().unwrap().push(query.clone());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let result = match self.answers.get(&query.expr).cloned() {
            Some(Answer::Body(body, delay)) => {
                tokio::time::sleep(delay).await;
                serde_json::from_str(&body).map_err(AdapterError::from)
            }
            Some(Answer::Fail) => Err(AdapterError::Connection("connection refused".to_string())),
            None => serde_json::from_str(&matrix(&[])).map_err(AdapterError::from),
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    fn target(&self) -> &str {
        "fake:9090"
    }
}
