//! Errors surfaced to the route layer.

use thiserror::Error;

use promportal_adapters::AdapterError;

use crate::registry::Operation;

/// Whole-request failures.
///
/// Failures of a single backend query never show up here: they are logged
/// and turned into "no data" for that query.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The reachability probe gave up before any query was sent.
    #[error("Backend {target} unreachable")]
    BackendUnavailable { target: String },

    /// The request itself is malformed.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A request identifier cannot be turned into a query.
    #[error(transparent)]
    Adapter(#[from] AdapterError),

    /// No handler is registered for the operation.
    #[error("No handler configured for {0}")]
    HandlerNotConfigured(Operation),
}
