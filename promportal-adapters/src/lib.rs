//! # promportal-adapters
//!
//! Access to the metrics backend behind a portal data source.
//!
//! This crate turns objects and metric ids into query expressions, runs
//! range queries over HTTP, and decodes the answers into samples the engine
//! can assemble into portal responses.
//!
//! ## Modules
//!
//! - [`query`]: builds `metric{type="id"}` selectors, optionally wrapped in `sum(...)`
//! - [`response`]: decodes `query_range` bodies and reduces them (top value, first series)
//! - [`backend`]: the [`MetricsBackend`] trait, range query shape, TCP probe with retry
//! - [`prometheus`] (`prometheus` feature, default): the reqwest-based client
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use promportal_adapters::prometheus::PrometheusClient;
//! use promportal_adapters::query::{build_query, Aggregation};
//! use promportal_adapters::{MetricsBackend, RangeQuery};
//! use promportal_types::ObjectDefinition;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = PrometheusClient::builder()
//!         .hostname("localhost")
//!         .port(9090)
//!         .build()?;
//!
//!     let host = ObjectDefinition::new("h1", "host", "Host1");
//!     let expr = build_query(&host, "node_load1", Aggregation::None)?;
//!     let response = client
//!         .range_query(&RangeQuery::new(expr, 1700000000, 1700003600, 60))
//!         .await?;
//!
//!     println!("{:?}", response.first_series());
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod error;
pub mod query;
pub mod response;

#[cfg(feature = "prometheus")]
pub mod prometheus;

pub use backend::{MetricsBackend, RangeQuery, RetryPolicy};
pub use error::AdapterError;
pub use response::{RangeResponse, RawSample};

// Re-export types for convenience
pub use promportal_types::{ObjectDefinition, ObjectFilter};
