//! Query expression synthesis.
//!
//! An object is selected in the backend by a label named after its type whose
//! value is the object id, so `host`/`h1` with metric `cpu` becomes
//! `cpu{host="h1"}`. Top-N scans wrap the selector in `sum(...)` so that every
//! series of the object collapses into one.
//!
//! Identifiers are checked before they are spliced into the expression. An
//! identifier that would change the meaning of the selector is rejected with
//! [`AdapterError::InvalidIdentifier`] instead of being sent to the backend.

use promportal_types::ObjectDefinition;

use crate::error::IdentifierKind;
use crate::AdapterError;

/// How a selector is wrapped before it is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Aggregation {
    /// The bare selector, for raw time series.
    #[default]
    None,
    /// `sum(selector)`, for top-N scans.
    Sum,
}

/// Build the query expression for one metric of one object.
///
/// # Example
///
/// ```rust
/// use promportal_adapters::query::{build_query, Aggregation};
/// use promportal_types::ObjectDefinition;
///
/// let host = ObjectDefinition::new("h1", "host", "Host1");
/// assert_eq!(build_query(&host, "cpu", Aggregation::None).unwrap(), r#"cpu{host="h1"}"#);
/// assert_eq!(build_query(&host, "cpu", Aggregation::Sum).unwrap(), r#"sum(cpu{host="h1"})"#);
/// ```
pub fn build_query(
    object: &ObjectDefinition,
    metric_id: &str,
    aggregation: Aggregation,
) -> Result<String, AdapterError> {
    validate_metric_name(metric_id)?;
    validate_label_name(&object.object_type_id)?;
    validate_label_value(&object.object_id)?;

    let selector = format!(
        "{}{{{}=\"{}\"}}",
        metric_id, object.object_type_id, object.object_id
    );

    Ok(match aggregation {
        Aggregation::None => selector,
        Aggregation::Sum => format!("sum({})", selector),
    })
}

/// Check that a metric name matches `[a-zA-Z_:][a-zA-Z0-9_:]*`.
pub fn validate_metric_name(name: &str) -> Result<(), AdapterError> {
    if is_identifier(name, |c| c.is_ascii_alphanumeric() || c == '_' || c == ':') {
        Ok(())
    } else {
        Err(AdapterError::invalid(IdentifierKind::Metric, name))
    }
}

/// Check that a label name matches `[a-zA-Z_][a-zA-Z0-9_]*`.
pub fn validate_label_name(name: &str) -> Result<(), AdapterError> {
    if is_identifier(name, |c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(AdapterError::invalid(IdentifierKind::Label, name))
    }
}

/// Check that a label value can sit between double quotes unescaped.
pub fn validate_label_value(value: &str) -> Result<(), AdapterError> {
    if value.chars().any(|c| c == '"' || c == '\\' || c.is_control()) {
        Err(AdapterError::invalid(IdentifierKind::LabelValue, value))
    } else {
        Ok(())
    }
}

fn is_identifier(s: &str, allowed: impl Fn(char) -> bool) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        // Digits are allowed, just not first
        Some(first) if allowed(first) && !first.is_ascii_digit() => chars.all(&allowed),
        _ => false,
    }
}
