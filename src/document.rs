//! JSON document model
//!
//! A document has two sections: `@layout`, the ordered list of top-level view
//! nodes, and `@constraints`, the ordered list of format-language constraint
//! specs. Node keys prefixed with `@` (`@isa`, `@id`, `@subviews`) are
//! structural; every other key is an attribute to apply to the built view.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::MarkupError;

/// Key naming a node's view kind
pub const KIND_KEY: &str = "@isa";
/// Key naming a node's identifier
pub const ID_KEY: &str = "@id";
/// Key holding a node's children
pub const SUBVIEWS_KEY: &str = "@subviews";
/// Top-level key holding the node list
pub const LAYOUT_KEY: &str = "@layout";
/// Top-level key holding the constraint specs
pub const CONSTRAINTS_KEY: &str = "@constraints";

/// Root of a markup document
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Document {
    #[serde(rename = "@layout", default)]
    pub layout: Vec<Node>,
    #[serde(rename = "@constraints", default)]
    pub constraints: Vec<ConstraintSpec>,
}

/// One view to instantiate
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Node {
    #[serde(rename = "@isa")]
    pub kind: String,
    #[serde(rename = "@id", default)]
    pub id: Option<String>,
    #[serde(rename = "@subviews", default)]
    pub children: Vec<Node>,
    /// Remaining keys, in document order
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// A layout constraint written in the visual format language
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConstraintSpec {
    pub format: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub metrics: HashMap<String, f64>,
}

impl Document {
    /// Parse a document from JSON text
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(json: &str) -> Result<Self, MarkupError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Interpret an already-parsed JSON value as a document
    pub fn from_value(value: Value) -> Result<Self, MarkupError> {
        Ok(serde_json::from_value(value)?)
    }

    /// Total number of nodes, including nested children
    pub fn node_count(&self) -> usize {
        fn count(nodes: &[Node]) -> usize {
            nodes.iter().map(|n| 1 + count(&n.children)).sum()
        }
        count(&self.layout)
    }
}

impl Node {
    /// Create a node with no id, attributes or children
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: None,
            children: Vec::new(),
            attributes: Map::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }
}

impl ConstraintSpec {
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
            options: Vec::new(),
            metrics: HashMap::new(),
        }
    }

    pub fn with_option(mut self, option: impl Into<String>) -> Self {
        self.options.push(option.into());
        self
    }

    pub fn with_metric(mut self, name: impl Into<String>, value: f64) -> Self {
        self.metrics.insert(name.into(), value);
        self
    }
}
