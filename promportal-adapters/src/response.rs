//! Decoding of range query responses.
//!
//! The backend answers `query_range` with
//! `{status, data: {resultType, result: [{metric, values: [[ts, "v"], ...]}]}}`.
//! Only successful `matrix` results carry data; anything else decodes to
//! "no data" rather than an error.

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::warn;

/// Status string of a successful response.
pub const STATUS_SUCCESS: &str = "success";

/// The only result type range queries are expected to return.
pub const RESULT_TYPE_MATRIX: &str = "matrix";

/// A decoded range query response body.
#[derive(Debug, Clone, Deserialize)]
pub struct RangeResponse {
    pub status: String,
    #[serde(default)]
    pub data: Option<RangeData>,
    #[serde(default, rename = "errorType")]
    pub error_type: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// The `data` member of a response.
#[derive(Debug, Clone, Deserialize)]
pub struct RangeData {
    #[serde(rename = "resultType")]
    pub result_type: String,
    #[serde(default)]
    pub result: Vec<Series>,
}

/// One series of a matrix result.
#[derive(Debug, Clone, Deserialize)]
pub struct Series {
    #[serde(default)]
    pub metric: BTreeMap<String, String>,
    #[serde(default)]
    pub values: Vec<RawSample>,
}

/// A `[timestamp, "value"]` pair as sent by the backend.
///
/// Values stay strings until assembly, where unparseable ones become `NaN`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawSample(pub f64, pub String);

impl RawSample {
    pub fn new(timestamp: f64, value: impl Into<String>) -> Self {
        Self(timestamp, value.into())
    }

    /// Timestamp in whole seconds.
    pub fn timestamp(&self) -> i64 {
        self.0 as i64
    }

    /// The sample parsed as a float, `NaN` when it is not a number.
    pub fn value(&self) -> f64 {
        self.1.trim().parse::<f64>().unwrap_or(f64::NAN)
    }
}

impl RangeResponse {
    /// Whether the backend reported success.
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }

    /// The series of a successful matrix result, `None` otherwise.
    pub fn matrix(&self) -> Option<&[Series]> {
        if !self.is_success() {
            warn!(
                error_type = self.error_type.as_deref().unwrap_or("unknown"),
                error = self.error.as_deref().unwrap_or(""),
                "Backend query failed"
            );
            return None;
        }
        match &self.data {
            Some(data) if data.result_type == RESULT_TYPE_MATRIX => Some(&data.result),
            Some(data) => {
                warn!(result_type = %data.result_type, "Unsupported result type");
                None
            }
            None => None,
        }
    }

    /// The largest sample across every returned series.
    ///
    /// Samples that are not finite numbers are ignored. Returns `None` when
    /// the response carries no usable sample at all.
    pub fn top_value(&self) -> Option<f64> {
        self.matrix()?
            .iter()
            .flat_map(|series| series.values.iter())
            .map(RawSample::value)
            .filter(|v| v.is_finite())
            .fold(None, |top, v| match top {
                Some(t) if t >= v => Some(t),
                _ => Some(v),
            })
    }

    /// The samples of the first returned series.
    ///
    /// A selector for a single object should match a single series; when the
    /// backend returns more, the first one is kept and the rest are logged and
    /// discarded.
    pub fn first_series(self) -> Option<Vec<RawSample>> {
        let count = self.matrix()?.len();
        let mut series = self.data?.result.into_iter();
        let first = series.next()?;
        if count > 1 {
            let discarded: Vec<_> = series.map(|s| s.metric).collect();
            warn!(
                kept = ?first.metric,
                ?discarded,
                "Range query returned {} series, keeping the first",
                count
            );
        }
        Some(first.values)
    }
}
