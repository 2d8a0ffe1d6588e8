//! Element and topology definitions.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Unique identifier for an element instance within a pipeline.
pub type ElementId = String;

/// Role of an element inside the pipeline chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementRole {
    /// Application-fed source; frames are injected through the feed protocol
    Source,
    /// In-place processing node
    Transform,
    /// Terminal node consuming the stream
    Sink,
}

/// Declarative description of one pipeline element.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementSpec {
    /// Unique identifier for this element instance
    pub id: ElementId,
    /// GStreamer factory name (e.g., "videoconvert", "autovideosink").
    /// For the source element this is ignored; the source is always built
    /// as an application source.
    pub factory: String,
    /// Position of the element in the processing chain
    pub role: ElementRole,
    /// Element properties as key-value pairs
    #[serde(default)]
    pub properties: HashMap<String, PropertyValue>,
}

impl ElementSpec {
    /// Shorthand for an element with no extra properties.
    pub fn new(id: impl Into<String>, factory: impl Into<String>, role: ElementRole) -> Self {
        Self {
            id: id.into(),
            factory: factory.into(),
            role,
            properties: HashMap::new(),
        }
    }
}

/// A link between two elements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    /// Source element id
    pub from: ElementId,
    /// Destination element id
    pub to: ElementId,
}

/// Property value that can be various types.
///
/// Element properties can be strings, numbers, or booleans; the engine maps
/// them onto the concrete GObject property type at apply time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    String(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::String(s)
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::String(s.to_string())
    }
}

impl From<i64> for PropertyValue {
    fn from(i: i64) -> Self {
        PropertyValue::Int(i)
    }
}

impl From<u64> for PropertyValue {
    fn from(u: u64) -> Self {
        PropertyValue::UInt(u)
    }
}

impl From<f64> for PropertyValue {
    fn from(f: f64) -> Self {
        PropertyValue::Float(f)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Bool(b)
    }
}
