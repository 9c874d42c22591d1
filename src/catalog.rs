//! The static object catalog and filter matching.
//!
//! The catalog is loaded once at startup and shared read-only between
//! requests. Matching expands portal [`ObjectFilter`]s into the concrete
//! objects they select.
//!
//! ```text
//! [host/*, disk/d2]  ──match_all──▶  host/h1, host/h2, disk/d2
//!   filter order                      (filter order, then catalog order)
//! ```

use promportal_types::{ObjectDefinition, ObjectFilter, SearchResponse, SearchResult};

/// The set of objects this data source knows about, in catalog order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectCatalog {
    objects: Vec<ObjectDefinition>,
}

impl ObjectCatalog {
    /// Create a catalog from its objects. Order is preserved.
    pub fn new(objects: Vec<ObjectDefinition>) -> Self {
        Self { objects }
    }

    /// Number of objects in the catalog.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Iterate over all objects in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &ObjectDefinition> {
        self.objects.iter()
    }

    /// Objects selected by one filter, in catalog order.
    ///
    /// A concrete instance id yields at most one object; a wildcard yields
    /// every object of the type. A filter that selects nothing is not an
    /// error, it just matches nothing.
    pub fn matches(&self, filter: &ObjectFilter) -> Vec<&ObjectDefinition> {
        self.objects.iter().filter(|o| filter.selects(o)).collect()
    }

    /// Apply [`matches`](Self::matches) to every filter and wrap the results.
    ///
    /// Results follow filter order, then catalog order. Each result carries
    /// the filter that selected it and no ranking value.
    pub fn match_all(&self, filters: &[ObjectFilter], valid_interval_seconds: f64) -> SearchResponse {
        let mut response = SearchResponse::with_valid_interval(valid_interval_seconds);
        for filter in filters {
            for object in self.matches(filter) {
                response.push(SearchResult::new(object.clone(), filter.clone()));
            }
        }
        response
    }
}

impl From<Vec<ObjectDefinition>> for ObjectCatalog {
    fn from(objects: Vec<ObjectDefinition>) -> Self {
        Self::new(objects)
    }
}
