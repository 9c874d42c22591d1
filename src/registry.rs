//! Operation registry.
//!
//! The portal calls three operations. Each one is bound at startup to a
//! handler implementation chosen from configuration; requests are routed by
//! their operation tag.
//!
//! ```text
//! OperationRequest ──dispatch──▶ HandlerRegistry ──▶ Arc<dyn PortalHandler>
//!   (tagged JSON)                 Operation → handler     (e.g. Engine)
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use promportal_types::{DataResponse, ObjectFilter, SearchResponse};

use crate::engine::{Engine, TimeSeriesBatch, TopNQuery};
use crate::EngineError;

/// The operations a portal data source answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    ObjectSearch,
    TopnSearch,
    TimeSeriesData,
}

impl Operation {
    /// Every operation, in a fixed order.
    pub const ALL: [Operation; 3] = [
        Operation::ObjectSearch,
        Operation::TopnSearch,
        Operation::TimeSeriesData,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Operation::ObjectSearch => "object_search",
            Operation::TopnSearch => "topn_search",
            Operation::TimeSeriesData => "time_series_data",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request for one operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum OperationRequest {
    ObjectSearch { object_filters: Vec<ObjectFilter> },
    TopnSearch(TopNQuery),
    TimeSeriesData(TimeSeriesBatch),
}

impl OperationRequest {
    /// The operation this request is for.
    pub fn operation(&self) -> Operation {
        match self {
            OperationRequest::ObjectSearch { .. } => Operation::ObjectSearch,
            OperationRequest::TopnSearch(_) => Operation::TopnSearch,
            OperationRequest::TimeSeriesData(_) => Operation::TimeSeriesData,
        }
    }
}

/// The response to an [`OperationRequest`], serialized as the bare portal body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OperationResponse {
    Search(SearchResponse),
    Data(Vec<DataResponse>),
}

/// An implementation of the portal operations.
#[async_trait]
pub trait PortalHandler: Send + Sync {
    async fn object_search(&self, filters: &[ObjectFilter]) -> Result<SearchResponse, EngineError>;

    async fn topn_search(&self, query: &TopNQuery) -> Result<SearchResponse, EngineError>;

    async fn time_series_data(
        &self,
        batch: &TimeSeriesBatch,
    ) -> Result<Vec<DataResponse>, EngineError>;
}

#[async_trait]
impl PortalHandler for Engine {
    async fn object_search(&self, filters: &[ObjectFilter]) -> Result<SearchResponse, EngineError> {
        Engine::object_search(self, filters)
    }

    async fn topn_search(&self, query: &TopNQuery) -> Result<SearchResponse, EngineError> {
        Engine::topn_search(self, query).await
    }

    async fn time_series_data(
        &self,
        batch: &TimeSeriesBatch,
    ) -> Result<Vec<DataResponse>, EngineError> {
        Engine::time_series_batch(self, batch).await
    }
}

/// Handler implementations that can be named in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HandlerKind {
    /// Answered by the Prometheus-backed engine.
    #[default]
    Prometheus,
    /// Not answered; requests fail with [`EngineError::HandlerNotConfigured`].
    Disabled,
}

/// Maps each operation to its handler.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: BTreeMap<Operation, Arc<dyn PortalHandler>>,
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("operations", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl HandlerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind every operation whose kind is [`HandlerKind::Prometheus`] to `engine`.
    pub fn from_kinds(
        kinds: impl IntoIterator<Item = (Operation, HandlerKind)>,
        engine: Arc<Engine>,
    ) -> Self {
        let mut registry = Self::new();
        for (operation, kind) in kinds {
            if kind == HandlerKind::Prometheus {
                registry = registry.register(operation, engine.clone());
            }
        }
        registry
    }

    /// Bind an operation to a handler, replacing any previous binding.
    pub fn register(mut self, operation: Operation, handler: Arc<dyn PortalHandler>) -> Self {
        self.handlers.insert(operation, handler);
        self
    }

    /// Whether an operation has a handler.
    pub fn is_registered(&self, operation: Operation) -> bool {
        self.handlers.contains_key(&operation)
    }

    /// Route a request to its handler.
    pub async fn dispatch(
        &self,
        request: &OperationRequest,
    ) -> Result<OperationResponse, EngineError> {
        let operation = request.operation();
        let handler = self
            .handlers
            .get(&operation)
            .ok_or(EngineError::HandlerNotConfigured(operation))?;
        debug!(%operation, "Dispatching");

        match request {
            OperationRequest::ObjectSearch { object_filters } => handler
                .object_search(object_filters)
                .await
                .map(OperationResponse::Search),
            OperationRequest::TopnSearch(query) => handler
                .topn_search(query)
                .await
                .map(OperationResponse::Search),
            OperationRequest::TimeSeriesData(batch) => handler
                .time_series_data(batch)
                .await
                .map(OperationResponse::Data),
        }
    }
}
