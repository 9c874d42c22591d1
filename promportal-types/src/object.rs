//! Object filters and object definitions.

/// Instance id that selects every instance of an object type.
pub const WILDCARD_INSTANCE: &str = "*";

/// Selects one instance, or all instances, of an object type.
///
/// Filters are immutable inputs: they arrive with a request and are echoed
/// back on the search results they produced.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjectFilter {
    /// The object type to select from (e.g. "host").
    pub object_type_id: String,

    /// A concrete object id, or [`WILDCARD_INSTANCE`].
    pub instance_id: String,
}

impl ObjectFilter {
    /// Create a filter for a type/instance pair.
    pub fn new(object_type_id: impl Into<String>, instance_id: impl Into<String>) -> Self {
        Self {
            object_type_id: object_type_id.into(),
            instance_id: instance_id.into(),
        }
    }

    /// Create a filter selecting all instances of a type.
    pub fn all(object_type_id: impl Into<String>) -> Self {
        Self::new(object_type_id, WILDCARD_INSTANCE)
    }

    /// Whether this filter selects every instance of its type.
    pub fn is_wildcard(&self) -> bool {
        self.instance_id == WILDCARD_INSTANCE
    }

    /// Whether a concrete object is selected by this filter.
    pub fn selects(&self, object: &ObjectDefinition) -> bool {
        self.object_type_id == object.object_type_id
            && (self.is_wildcard() || self.instance_id == object.object_id)
    }
}

/// A concrete object known to the data source.
///
/// Definitions are owned by the object catalog, which is loaded once at
/// startup and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjectDefinition {
    /// Id of the object, unique within its type.
    pub object_id: String,

    /// Id of the object's type.
    pub object_type_id: String,

    /// Name shown by the portal.
    pub display_name: String,
}

impl ObjectDefinition {
    /// Create a new object definition.
    pub fn new(
        object_id: impl Into<String>,
        object_type_id: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            object_id: object_id.into(),
            object_type_id: object_type_id.into(),
            display_name: display_name.into(),
        }
    }
}
