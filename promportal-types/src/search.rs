//! Search results and responses.

use crate::{ObjectDefinition, ObjectFilter};

/// Portal default for how long search results may be cached, in seconds.
pub const DEFAULT_VALID_INTERVAL_SECONDS: f64 = 300.0;

/// A single object matched by a search.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchResult {
    /// The matched object.
    pub object: ObjectDefinition,

    /// The value used for top-N ordering.
    ///
    /// `None` means no value was computed, either because the search does
    /// not rank or because the backend had no data for this object.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub value: Option<f64>,

    /// The filters that selected this object.
    #[cfg_attr(feature = "serde", serde(rename = "parent_object_filters"))]
    pub parent_filters: Vec<ObjectFilter>,
}

impl SearchResult {
    /// Create an unranked result for an object selected by `filter`.
    pub fn new(object: ObjectDefinition, filter: ObjectFilter) -> Self {
        Self {
            object,
            value: None,
            parent_filters: vec![filter],
        }
    }

    /// Set the ranking value.
    pub fn with_value(mut self, value: Option<f64>) -> Self {
        self.value = value;
        self
    }
}

/// The response to an object search or a top-N search.
///
/// Results are kept in append order unless re-sorted by a ranker.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchResponse {
    /// Matched objects.
    #[cfg_attr(feature = "serde", serde(rename = "search_results"))]
    pub results: Vec<SearchResult>,

    /// How long the portal may cache these results, in seconds.
    #[cfg_attr(feature = "serde", serde(rename = "valid_interval"))]
    pub valid_interval_seconds: f64,

    /// Reason the search failed, if it did.
    #[cfg_attr(
        feature = "serde",
        serde(rename = "search_error_string", skip_serializing_if = "Option::is_none")
    )]
    pub error: Option<String>,
}

impl SearchResponse {
    /// Create an empty response with the portal's default valid interval.
    pub fn new() -> Self {
        Self::with_valid_interval(DEFAULT_VALID_INTERVAL_SECONDS)
    }

    /// Create an empty response with a specific valid interval.
    pub fn with_valid_interval(valid_interval_seconds: f64) -> Self {
        Self {
            results: Vec::new(),
            valid_interval_seconds,
            error: None,
        }
    }

    /// Create a failed response carrying an error message and no results.
    pub fn failed(valid_interval_seconds: f64, error: impl Into<String>) -> Self {
        Self {
            results: Vec::new(),
            valid_interval_seconds,
            error: Some(error.into()),
        }
    }

    /// Append a result.
    pub fn push(&mut self, result: SearchResult) {
        self.results.push(result);
    }

    /// Number of results.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Check if there are no results.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Whether the search failed.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Iterate over the results.
    pub fn iter(&self) -> impl Iterator<Item = &SearchResult> {
        self.results.iter()
    }
}

impl Default for SearchResponse {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_result_is_unranked() {
        let result = SearchResult::new(
            ObjectDefinition::new("h1", "host", "Host1"),
            ObjectFilter::all("host"),
        );
        assert_eq!(result.value, None);
        assert_eq!(result.parent_filters, vec![ObjectFilter::all("host")]);
    }

    #[test]
    fn test_parent_filters_not_shared() {
        let object = ObjectDefinition::new("h1", "host", "Host1");
        let mut first = SearchResult::new(object.clone(), ObjectFilter::all("host"));
        let second = SearchResult::new(object, ObjectFilter::all("host"));

        first.parent_filters.push(ObjectFilter::new("rack", "r1"));

        assert_eq!(first.parent_filters.len(), 2);
        assert_eq!(second.parent_filters.len(), 1);
    }

    #[test]
    fn test_failed_response() {
        let response = SearchResponse::failed(120.0, "backend unreachable");
        assert!(response.is_error());
        assert!(response.is_empty());
        assert_eq!(response.valid_interval_seconds, 120.0);
    }

    #[test]
    fn test_default_valid_interval() {
        assert_eq!(SearchResponse::default().valid_interval_seconds, 300.0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_wire_names() {
        let mut response = SearchResponse::with_valid_interval(120.0);
        response.push(
            SearchResult::new(
                ObjectDefinition::new("h1", "host", "Host1"),
                ObjectFilter::all("host"),
            )
            .with_value(Some(20.0)),
        );

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["valid_interval"], 120.0);
        assert_eq!(json["search_results"][0]["value"], 20.0);
        assert_eq!(
            json["search_results"][0]["parent_object_filters"][0]["instance_id"],
            "*"
        );
        assert!(json.get("search_error_string").is_none());

        let parsed: SearchResponse = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, response);
    }
}
