//! Inbound time series request shapes.

use crate::ObjectFilter;

/// Statistic id used when a request does not name one.
pub const DEFAULT_STATISTIC_ID: &str = "raw";

/// Step used when a request has no known granularity.
pub const DEFAULT_STEP_SECONDS: u64 = 60;

/// Portal granularity ids and their sampling step in seconds.
pub const GRANULARITIES: &[(&str, u64)] = &[
    ("1m", 60),
    ("5m", 300),
    ("15m", 900),
    ("1h", 3_600),
    ("8h", 28_800),
    ("1d", 86_400),
];

/// Map a granularity id to a query step in seconds.
///
/// Unknown or absent granularities fall back to [`DEFAULT_STEP_SECONDS`].
pub fn step_for_granularity(granularity_id: Option<&str>) -> u64 {
    granularity_id
        .and_then(|id| GRANULARITIES.iter().find(|(g, _)| *g == id))
        .map(|(_, step)| *step)
        .unwrap_or(DEFAULT_STEP_SECONDS)
}

/// A metric and the statistic requested for it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MetricStatisticId {
    pub metric_id: String,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub statistic_id: Option<String>,
}

impl MetricStatisticId {
    pub fn new(metric_id: impl Into<String>) -> Self {
        Self {
            metric_id: metric_id.into(),
            statistic_id: None,
        }
    }
}

/// One data request inside a time series batch.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DataRequest {
    /// Id echoed back on the matching [`DataResponse`](crate::DataResponse).
    pub data_request_id: i64,

    /// Objects to fetch data for.
    pub object_filters: Vec<ObjectFilter>,

    /// Metrics to fetch for every matched object.
    pub metric_statistic_ids: Vec<MetricStatisticId>,
}

impl DataRequest {
    /// The metric ids, in request order.
    pub fn metric_ids(&self) -> Vec<String> {
        self.metric_statistic_ids
            .iter()
            .map(|m| m.metric_id.clone())
            .collect()
    }

    /// The statistic shared by this request's metrics.
    ///
    /// Taken from the first entry; [`DEFAULT_STATISTIC_ID`] when that entry
    /// names none.
    pub fn statistic_id(&self) -> &str {
        self.metric_statistic_ids
            .first()
            .and_then(|m| m.statistic_id.as_deref())
            .unwrap_or(DEFAULT_STATISTIC_ID)
    }
}
