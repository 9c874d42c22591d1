//! # promportal
//!
//! A data source for a monitoring portal, answering the portal's object and
//! metric queries from a Prometheus server.
//!
//! The portal knows objects by a type and an instance id. A static catalog
//! maps those onto display names, and every metric of an object is the
//! Prometheus series `metric{<type>="<id>"}`.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │  OperationRequest (JSON)                                      │
//! │        │                                                      │
//! │        ▼                                                      │
//! │  ┌──────────┐    ┌──────────┐    ┌─────────────────────────┐  │
//! │  │ registry │───▶│  engine  │───▶│ promportal-adapters     │  │
//! │  │(dispatch)│    │(pipeline)│    │ PrometheusClient        │  │
//! │  └──────────┘    └────┬─────┘    └─────────────────────────┘  │
//! │                       │                                       │
//! │                       ▼                                       │
//! │                  ┌─────────┐                                  │
//! │                  │ catalog │◀── config (objects)              │
//! │                  └─────────┘                                  │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`catalog`]**: filter expansion over the configured objects
//! - **[`engine`]**: object search, top-N ranking and time series retrieval
//! - **[`registry`]**: binds each portal operation to a handler
//! - **[`config`]**: file and environment settings
//!
//! ## Usage
//!
//! Object search never touches the backend:
//!
//! ```
//! use std::sync::Arc;
//! use promportal::{Engine, EngineSettings, ObjectCatalog};
//! use promportal_adapters::prometheus::PrometheusClient;
//! use promportal_types::{ObjectDefinition, ObjectFilter};
//!
//! let catalog = ObjectCatalog::new(vec![
//!     ObjectDefinition::new("h1", "host", "Host1"),
//!     ObjectDefinition::new("h2", "host", "Host2"),
//! ]);
//! let backend = PrometheusClient::builder()
//!     .hostname("localhost")
//!     .port(9090)
//!     .build()
//!     .unwrap();
//! let engine = Engine::new(Arc::new(catalog), Arc::new(backend), EngineSettings::default());
//!
//! let response = engine.object_search(&[ObjectFilter::all("host")]).unwrap();
//! assert_eq!(response.len(), 2);
//! assert_eq!(response.valid_interval_seconds, 120.0);
//! ```
//!
//! Requests from the portal go through a [`HandlerRegistry`]:
//!
//! ```no_run
//! use std::sync::Arc;
//! use promportal::{Engine, HandlerRegistry, OperationRequest, Settings};
//!
//! # tokio_test::block_on(async {
//! let settings = Settings::load(Some("promportal.yaml".as_ref())).unwrap();
//! let engine = Engine::new(
//!     Arc::new(settings.catalog()),
//!     Arc::new(settings.build_backend().unwrap()),
//!     settings.engine_settings(),
//! );
//! let registry = HandlerRegistry::from_kinds(settings.handlers.kinds(), Arc::new(engine));
//!
//! let request: OperationRequest = serde_json::from_str(
//!     r#"{"operation":"topn_search","object_filters":[{"object_type_id":"host","instance_id":"*"}],
//!        "metric_id":"cpu","n_value":5,"start_time_seconds":1700000000,"end_time_seconds":1700003600}"#,
//! ).unwrap();
//! let response = registry.dispatch(&request).await.unwrap();
//! println!("{}", serde_json::to_string_pretty(&response).unwrap());
//! # });
//! ```

pub mod catalog;
pub mod config;
pub mod duration;
pub mod engine;
pub mod error;
pub mod registry;

pub use catalog::ObjectCatalog;
pub use config::Settings;
pub use engine::{Engine, EngineSettings, TimeSeriesBatch, TimeSeriesQuery, TopNQuery};
pub use error::EngineError;
pub use registry::{
    HandlerKind, HandlerRegistry, Operation, OperationRequest, OperationResponse, PortalHandler,
};
