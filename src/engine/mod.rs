//! The request pipeline: filters in, backend queries out, portal shapes back.
//!
//! ## Data Flow
//!
//! ```text
//! object filters
//!        │
//!        ▼
//! ObjectCatalog::match_all()         ──▶ object_search
//!        │
//!        ▼
//! MetricsBackend::probe()            (once per request)
//!        │
//!        ▼
//! build_query() per (object, metric) ──▶ range_query()   (bounded, ordered)
//!        │
//!        ├──▶ top_value() ──▶ rank()              ──▶ topn_search
//!        │
//!        └──▶ first_series() ──▶ assemble()       ──▶ time_series_data
//! ```
//!
//! ## Submodules
//!
//! - [`assemble`]: backend samples to [`DataPoint`](promportal_types::DataPoint)s,
//!   [`MetricValue`](promportal_types::MetricValue)s and [`DataResponse`]s
//! - [`rank`]: top-N ordering of [`SearchResult`](promportal_types::SearchResult)s

pub mod assemble;
pub mod rank;

#[cfg(test)]
pub(crate) mod fake;

pub use assemble::{assemble, to_data_response, to_metric_value};
pub use rank::rank;

use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use promportal_adapters::query::{build_query, validate_metric_name, Aggregation};
use promportal_adapters::{MetricsBackend, RangeQuery};
use promportal_types::{
    step_for_granularity, DataPoint, DataRequest, DataResponse, ObjectDefinition, ObjectFilter,
    SearchResponse, SummaryRule,
};

use crate::catalog::ObjectCatalog;
use crate::EngineError;

/// Cache lifetime reported on search responses.
pub const DEFAULT_VALID_INTERVAL_SECONDS: f64 = 120.0;

/// Backend queries allowed in flight for one request.
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 4;

/// Tunables of the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineSettings {
    pub valid_interval_seconds: f64,
    pub max_concurrent_requests: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            valid_interval_seconds: DEFAULT_VALID_INTERVAL_SECONDS,
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
        }
    }
}

/// A top-N search as posted by the portal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopNQuery {
    pub object_filters: Vec<ObjectFilter>,
    pub metric_id: String,
    pub n_value: usize,
    pub start_time_seconds: i64,
    pub end_time_seconds: i64,
    #[serde(default)]
    pub ascending: bool,
}

/// Time series for a set of objects and metrics, answered by one [`DataResponse`].
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesQuery {
    pub object_filters: Vec<ObjectFilter>,
    pub metric_ids: Vec<String>,
    pub statistic_id: String,
    pub request_id: i64,
    pub summary_rule: Option<SummaryRule>,
    pub start: i64,
    pub end: i64,
    pub step: u64,
}

/// Several data requests sharing one time window, as posted by the portal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesBatch {
    pub start_time_seconds: i64,
    pub end_time_seconds: i64,
    #[serde(default)]
    pub granularity_id: Option<String>,
    #[serde(default)]
    pub suggested_summary_rule: Option<SummaryRule>,
    pub data_requests: Vec<DataRequest>,
}

impl TimeSeriesBatch {
    /// One query per data request, in request order.
    pub fn queries(&self) -> Vec<TimeSeriesQuery> {
        let step = step_for_granularity(self.granularity_id.as_deref());
        self.data_requests
            .iter()
            .map(|request| TimeSeriesQuery {
                object_filters: request.object_filters.clone(),
                metric_ids: request.metric_ids(),
                statistic_id: request.statistic_id().to_string(),
                request_id: request.data_request_id,
                summary_rule: self.suggested_summary_rule,
                start: self.start_time_seconds,
                end: self.end_time_seconds,
                step,
            })
            .collect()
    }
}

/// Answers portal operations from the object catalog and a metrics backend.
#[derive(Debug, Clone)]
pub struct Engine {
    catalog: Arc<ObjectCatalog>,
    backend: Arc<dyn MetricsBackend>,
    settings: EngineSettings,
}

impl Engine {
    /// Create an engine over a shared catalog and backend.
    pub fn new(
        catalog: Arc<ObjectCatalog>,
        backend: Arc<dyn MetricsBackend>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            catalog,
            backend,
            settings,
        }
    }

    /// The object catalog.
    pub fn catalog(&self) -> &ObjectCatalog {
        &self.catalog
    }

    /// The metrics backend.
    pub fn backend(&self) -> &dyn MetricsBackend {
        self.backend.as_ref()
    }

    /// Expand filters into the objects they select. No backend access.
    pub fn object_search(&self, filters: &[ObjectFilter]) -> Result<SearchResponse, EngineError> {
        validate_filters(filters)?;
        Ok(self
            .catalog
            .match_all(filters, self.settings.valid_interval_seconds))
    }

    /// Rank matched objects by the largest sample of a metric over a window.
    ///
    /// Each object is scored with one `sum(...)` query stepped over the whole
    /// window. An unreachable backend yields a response carrying an error and
    /// no results; a failed query only leaves its object unscored.
    pub async fn topn_search(&self, query: &TopNQuery) -> Result<SearchResponse, EngineError> {
        validate_window(query.start_time_seconds, query.end_time_seconds)?;
        validate_metric_name(&query.metric_id)?;

        let mut response = self.object_search(&query.object_filters)?;
        if response.is_empty() {
            return Ok(response);
        }

        if let Err(e) = self.ensure_reachable().await {
            return Ok(SearchResponse::failed(
                self.settings.valid_interval_seconds,
                e.to_string(),
            ));
        }

        let window = Window {
            start: query.start_time_seconds,
            end: query.end_time_seconds,
            step: query.end_time_seconds.abs_diff(query.start_time_seconds).max(1),
        };
        let jobs: Vec<(ObjectDefinition, String)> = response
            .results
            .iter()
            .map(|result| (result.object.clone(), query.metric_id.clone()))
            .collect();

        let backend = Arc::clone(&self.backend);
        let values: Vec<Option<f64>> = stream::iter(jobs)
            .map(move |(object, metric_id)| {
                let backend = Arc::clone(&backend);
                async move { top_value(backend.as_ref(), &object, &metric_id, window).await }
            })
            .buffered(self.width())
            .collect()
            .await;

        for (result, value) in response.results.iter_mut().zip(values) {
            result.value = value;
        }
        response.results = rank(
            std::mem::take(&mut response.results),
            query.n_value,
            query.ascending,
        );
        Ok(response)
    }

    /// Fetch every metric for every matched object as one data response.
    ///
    /// Metric values are ordered by object (filter order, then catalog order)
    /// and then by metric, whatever order the backend answers in.
    pub async fn time_series_data(
        &self,
        query: &TimeSeriesQuery,
    ) -> Result<DataResponse, EngineError> {
        let objects = self.prepare(query)?;
        if !objects.is_empty() {
            self.ensure_reachable().await?;
        }
        Ok(self.fetch_time_series(query, &objects).await)
    }

    /// Answer a batch of data requests, one response per request, in order.
    ///
    /// The whole batch is validated and the backend probed once before any
    /// query is sent.
    pub async fn time_series_batch(
        &self,
        batch: &TimeSeriesBatch,
    ) -> Result<Vec<DataResponse>, EngineError> {
        let queries = batch.queries();
        let prepared = queries
            .iter()
            .map(|query| self.prepare(query))
            .collect::<Result<Vec<_>, _>>()?;

        if prepared.iter().any(|objects| !objects.is_empty()) {
            self.ensure_reachable().await?;
        }

        let mut responses = Vec::with_capacity(queries.len());
        for (query, objects) in queries.iter().zip(&prepared) {
            responses.push(self.fetch_time_series(query, objects).await);
        }
        Ok(responses)
    }

    fn prepare(&self, query: &TimeSeriesQuery) -> Result<Vec<&ObjectDefinition>, EngineError> {
        validate_filters(&query.object_filters)?;
        validate_window(query.start, query.end)?;
        if query.step == 0 {
            return Err(EngineError::InvalidRequest("step must be positive".to_string()));
        }
        for metric_id in &query.metric_ids {
            validate_metric_name(metric_id)?;
        }

        Ok(query
            .object_filters
            .iter()
            .flat_map(|filter| self.catalog.matches(filter))
            .collect())
    }

    async fn ensure_reachable(&self) -> Result<(), EngineError> {
        if self.backend.probe().await {
            Ok(())
        } else {
            Err(EngineError::BackendUnavailable {
                target: self.backend.target().to_string(),
            })
        }
    }

    async fn fetch_time_series(
        &self,
        query: &TimeSeriesQuery,
        objects: &[&ObjectDefinition],
    ) -> DataResponse {
        let window = Window {
            start: query.start,
            end: query.end,
            step: query.step,
        };
        let jobs: Vec<(ObjectDefinition, String)> = objects
            .iter()
            .flat_map(|object| {
                query
                    .metric_ids
                    .iter()
                    .map(move |metric_id| ((*object).clone(), metric_id.clone()))
            })
            .collect();

        let backend = Arc::clone(&self.backend);
        let fetched: Vec<(String, Vec<DataPoint>)> = stream::iter(jobs)
            .map(move |(object, metric_id)| {
                let backend = Arc::clone(&backend);
                async move {
                    let points = fetch_points(backend.as_ref(), &object, &metric_id, window).await;
                    (metric_id, points)
                }
            })
            .buffered(self.width())
            .collect()
            .await;

        let metric_values = fetched
            .into_iter()
            .map(|(metric_id, points)| {
                to_metric_value(&metric_id, &query.statistic_id, points, query.summary_rule)
            })
            .collect();
        to_data_response(query.request_id, metric_values)
    }

    fn width(&self) -> usize {
        self.settings.max_concurrent_requests.max(1)
    }
}

/// Time range and resolution shared by the queries of one request.
#[derive(Debug, Clone, Copy)]
struct Window {
    start: i64,
    end: i64,
    step: u64,
}

async fn top_value(
    backend: &dyn MetricsBackend,
    object: &ObjectDefinition,
    metric_id: &str,
    window: Window,
) -> Option<f64> {
    let expr = match build_query(object, metric_id, Aggregation::Sum) {
        Ok(expr) => expr,
        Err(e) => {
            warn!(object = %object.object_id, error = %e, "Skipping object in top-N scan");
            return None;
        }
    };

    match backend
        .range_query(&RangeQuery::new(expr, window.start, window.end, window.step))
        .await
    {
        Ok(response) => {
            let value = response.top_value();
            debug!(object = %object.object_id, metric_id, ?value, "Top value");
            value
        }
        Err(e) => {
            warn!(object = %object.object_id, metric_id, error = %e, "Top-N query failed");
            None
        }
    }
}

async fn fetch_points(
    backend: &dyn MetricsBackend,
    object: &ObjectDefinition,
    metric_id: &str,
    window: Window,
) -> Vec<DataPoint> {
    let expr = match build_query(object, metric_id, Aggregation::None) {
        Ok(expr) => expr,
        Err(e) => {
            warn!(object = %object.object_id, error = %e, "Skipping object in series fetch");
            return Vec::new();
        }
    };

    match backend
        .range_query(&RangeQuery::new(expr, window.start, window.end, window.step))
        .await
    {
        Ok(response) => response
            .first_series()
            .map(|raw| assemble(&raw))
            .unwrap_or_default(),
        Err(e) => {
            warn!(object = %object.object_id, metric_id, error = %e, "Series query failed");
            Vec::new()
        }
    }
}

fn validate_filters(filters: &[ObjectFilter]) -> Result<(), EngineError> {
    match filters
        .iter()
        .find(|f| f.object_type_id.is_empty() || f.instance_id.is_empty())
    {
        Some(filter) => Err(EngineError::InvalidRequest(format!(
            "incomplete object filter {:?}/{:?}",
            filter.object_type_id, filter.instance_id
        ))),
        None => Ok(()),
    }
}

fn validate_window(start: i64, end: i64) -> Result<(), EngineError> {
    if end < start {
        Err(EngineError::InvalidRequest(format!(
            "end time {} is before start time {}",
            end, start
        )))
    } else {
        Ok(())
    }
}
