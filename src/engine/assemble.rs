//! Conversion of backend samples into portal shapes.

use promportal_adapters::RawSample;
use promportal_types::{DataPoint, DataResponse, MetricValue, SummaryRule};

/// Turn backend samples into data points.
///
/// Values that do not parse as numbers, including the backend's `"NaN"`,
/// become `NaN` points. Points are kept in timestamp order.
pub fn assemble(raw: &[RawSample]) -> Vec<DataPoint> {
    let mut points: Vec<DataPoint> = raw
        .iter()
        .map(|s| DataPoint::new(s.timestamp(), s.value()))
        .collect();
    // Stable, so already-ordered backend output is untouched
    points.sort_by_key(|p| p.timestamp);
    points
}

/// Wrap the points of one (object, metric) query.
pub fn to_metric_value(
    metric_id: &str,
    statistic_id: &str,
    points: Vec<DataPoint>,
    summary_rule: Option<SummaryRule>,
) -> MetricValue {
    MetricValue::new(metric_id, statistic_id, points).with_summary_rule(summary_rule)
}

/// Batch every metric value of one data request under its id.
pub fn to_data_response(request_id: i64, metric_values: Vec<MetricValue>) -> DataResponse {
    DataResponse::new(request_id, metric_values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_sample() {
        let points = assemble(&[RawSample::new(1700000000.0, "42.5")]);
        assert_eq!(points, vec![DataPoint::new(1700000000, 42.5)]);
    }

    #[test]
    fn test_nan_sample() {
        let points = assemble(&[RawSample::new(1700000000.0, "NaN")]);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].timestamp, 1700000000);
        assert!(points[0].value.is_nan());
    }

    #[test]
    fn test_malformed_sample_is_nan() {
        let points = assemble(&[
            RawSample::new(1700000000.0, "1"),
            RawSample::new(1700000060.0, "n/a"),
            RawSample::new(1700000120.0, "+Inf"),
        ]);
        assert_eq!(points.len(), 3);
        assert!(points[1].value.is_nan());
        assert!(points[2].value.is_infinite());
    }

    #[test]
    fn test_timestamps_non_decreasing() {
        let points = assemble(&[
            RawSample::new(120.0, "3"),
            RawSample::new(60.0, "2"),
            RawSample::new(120.0, "4"),
        ]);
        let timestamps: Vec<_> = points.iter().map(|p| p.timestamp).collect();
        assert_eq!(timestamps, vec![60, 120, 120]);
        // Equal timestamps keep backend order
        assert_eq!(points[1].value, 3.0);
    }

    #[test]
    fn test_metric_value_and_response() {
        let points = assemble(&[RawSample::new(100.0, "1"), RawSample::new(160.0, "NaN")]);
        let mv = to_metric_value("cpu", "raw", points, Some(SummaryRule::Avg));

        assert_eq!(mv.metric_id, "cpu");
        assert_eq!(mv.statistic_id, "raw");
        assert_eq!(mv.summary_rule, Some(SummaryRule::Avg));
        assert_eq!(mv.last_valid_timestamp, Some(100));

        let response = to_data_response(9, vec![mv]);
        assert_eq!(response.request_id, 9);
        assert_eq!(response.metric_values.len(), 1);
    }
}
