//! # promportal-types
//!
//! Core types for the portal data source protocol. A portal asks a data
//! source for objects (searches, top-N searches) and for time series data;
//! this crate defines the typed shapes of those requests and responses.
//!
//! ## Design Goals
//!
//! - **Zero required dependencies**: Core types work without any serialization framework
//! - **Optional serialization**: Enable the `serde` feature to get JSON field names
//!   that match the portal wire format (`parent_object_filters`, `data_request_id`, ...)
//! - **Fresh per request**: Every value is owned by the request that produced it
//!
//! ## Example
//!
//! ```rust
//! use promportal_types::{DataPoint, DataResponse, MetricValue, ObjectDefinition, ObjectFilter,
//!     SearchResponse, SearchResult};
//!
//! let host = ObjectDefinition::new("h1", "host", "Host1");
//! let filter = ObjectFilter::all("host");
//!
//! let mut search = SearchResponse::with_valid_interval(120.0);
//! search.push(SearchResult::new(host, filter));
//! assert_eq!(search.len(), 1);
//!
//! let mv = MetricValue::new("cpu", "raw", vec![DataPoint::new(1700000000, 42.5)]);
//! let response = DataResponse::new(7, vec![mv]);
//! assert_eq!(response.request_id, 7);
//! ```

mod object;
mod request;
mod search;
mod series;

pub use object::*;
pub use request::*;
pub use search::*;
pub use series::*;
