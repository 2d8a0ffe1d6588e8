//! Pipeline descriptions.

use crate::element::{ElementId, ElementRole, ElementSpec, Link};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a pipeline instance.
pub type PipelineId = Uuid;

/// A complete pipeline definition.
///
/// Element order matters: when `links` is empty the controller links the
/// elements as a chain in insertion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSpec {
    /// Unique identifier for this pipeline
    pub id: PipelineId,
    /// Human-readable name
    pub name: String,
    /// Ordered elements in this pipeline
    #[serde(default)]
    pub elements: Vec<ElementSpec>,
    /// Explicit links between elements; empty means "chain in order"
    #[serde(default)]
    pub links: Vec<Link>,
}

impl PipelineSpec {
    /// Create a new empty pipeline description with a generated ID.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            elements: Vec::new(),
            links: Vec::new(),
        }
    }

    /// Create a pipeline description with a specific ID.
    pub fn with_id(id: PipelineId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            elements: Vec::new(),
            links: Vec::new(),
        }
    }

    /// The application-fed source element, if the description has one.
    pub fn source(&self) -> Option<&ElementSpec> {
        self.elements
            .iter()
            .find(|e| e.role == ElementRole::Source)
    }

    /// Ids of all elements with the given role.
    pub fn ids_with_role(&self, role: ElementRole) -> Vec<&ElementId> {
        self.elements
            .iter()
            .filter(|e| e.role == role)
            .map(|e| &e.id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_lookup() {
        let mut spec = PipelineSpec::new("test");
        spec.elements = vec![
            ElementSpec::new("src", "appsrc", ElementRole::Source),
            ElementSpec::new("sink", "fakesink", ElementRole::Sink),
        ];
        assert_eq!(spec.source().map(|e| e.id.as_str()), Some("src"));
        assert_eq!(spec.ids_with_role(ElementRole::Sink), vec!["sink"]);
    }

    #[test]
    fn test_serde_round_trip() {
        let mut spec = PipelineSpec::new("serde");
        spec.elements = vec![ElementSpec::new("src", "appsrc", ElementRole::Source)];
        let json = serde_json::to_string(&spec).unwrap();
        let back: PipelineSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(back.name, "serde");
        assert_eq!(back.elements.len(), 1);
        assert!(back.links.is_empty());
    }
}
