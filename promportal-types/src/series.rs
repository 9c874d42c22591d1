//! Time series data points, metric values, and data responses.

use core::fmt;
use core::str::FromStr;

/// A single time series sample.
///
/// A `NaN` value marks a timestamp with no valid sample. It is a normal data
/// point, not an error.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DataPoint {
    /// Unix timestamp in seconds, UTC.
    pub timestamp: i64,

    /// Sample value, `NaN` for "no data". Serialized as `null`.
    #[cfg_attr(feature = "serde", serde(with = "nan_as_null"))]
    pub value: f64,

    /// Weight used by the portal when averaging.
    #[cfg_attr(feature = "serde", serde(rename = "weight_value", default = "default_weight"))]
    pub weight: f64,
}

impl DataPoint {
    /// Create a data point with the default weight of 1.0.
    pub fn new(timestamp: i64, value: f64) -> Self {
        Self {
            timestamp,
            value,
            weight: default_weight(),
        }
    }

    /// Create a "no data" point.
    pub fn missing(timestamp: i64) -> Self {
        Self::new(timestamp, f64::NAN)
    }

    /// Whether this point carries a real sample.
    pub fn has_value(&self) -> bool {
        self.value.is_finite()
    }
}

fn default_weight() -> f64 {
    1.0
}

/// Suggested rule for summarizing a metric's series into one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SummaryRule {
    Sum,
    Max,
    Min,
    Avg,
    LastValue,
}

impl SummaryRule {
    /// The wire name of this rule.
    pub const fn as_str(&self) -> &'static str {
        match self {
            SummaryRule::Sum => "sum",
            SummaryRule::Max => "max",
            SummaryRule::Min => "min",
            SummaryRule::Avg => "avg",
            SummaryRule::LastValue => "last_value",
        }
    }
}

impl fmt::Display for SummaryRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown summary rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSummaryRule(pub String);

impl fmt::Display for UnknownSummaryRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown summary rule: {}", self.0)
    }
}

impl std::error::Error for UnknownSummaryRule {}

impl FromStr for SummaryRule {
    type Err = UnknownSummaryRule;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sum" => Ok(SummaryRule::Sum),
            "max" => Ok(SummaryRule::Max),
            "min" => Ok(SummaryRule::Min),
            "avg" => Ok(SummaryRule::Avg),
            "last_value" => Ok(SummaryRule::LastValue),
            other => Err(UnknownSummaryRule(other.to_string())),
        }
    }
}

/// The time series for one metric/statistic pair of one object.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MetricValue {
    /// The metric id.
    pub metric_id: String,

    /// The statistic id.
    pub statistic_id: String,

    /// Suggested summary rule, if any.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub summary_rule: Option<SummaryRule>,

    /// Samples ordered by timestamp.
    #[cfg_attr(feature = "serde", serde(rename = "data_points"))]
    pub points: Vec<DataPoint>,

    /// Timestamp of the last point carrying a real sample.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub last_valid_timestamp: Option<i64>,
}

impl MetricValue {
    /// Create a metric value from its points.
    ///
    /// `last_valid_timestamp` is derived from the last point with a finite value.
    pub fn new(
        metric_id: impl Into<String>,
        statistic_id: impl Into<String>,
        points: Vec<DataPoint>,
    ) -> Self {
        let last_valid_timestamp = points.iter().rev().find(|p| p.has_value()).map(|p| p.timestamp);
        Self {
            metric_id: metric_id.into(),
            statistic_id: statistic_id.into(),
            summary_rule: None,
            points,
            last_valid_timestamp,
        }
    }

    /// Set the suggested summary rule.
    pub fn with_summary_rule(mut self, rule: Option<SummaryRule>) -> Self {
        self.summary_rule = rule;
        self
    }

    /// Check if there are no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// The answer to one data request.
///
/// `request_id` always echoes the id of the request it answers so the portal
/// can correlate responses.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DataResponse {
    /// Id of the originating data request.
    #[cfg_attr(feature = "serde", serde(rename = "data_request_id"))]
    pub request_id: i64,

    /// One entry per (object, metric) pair queried.
    pub metric_values: Vec<MetricValue>,
}

impl DataResponse {
    /// Create a response for a request id.
    pub fn new(request_id: i64, metric_values: Vec<MetricValue>) -> Self {
        Self {
            request_id,
            metric_values,
        }
    }
}

#[cfg(feature = "serde")]
mod nan_as_null {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_nan() {
            serializer.serialize_none()
        } else {
            serializer.serialize_f64(*value)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
    }
}
