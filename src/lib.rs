//! Latte - declarative JSON markup for native view hierarchies
//!
//! This library builds view trees from JSON documents, wires live data
//! bindings into their attributes and resolves visual-format layout strings
//! into constraint descriptors.
//!
//! # Example
//!
//! ```rust
//! use latte::render;
//! use serde_json::json;
//!
//! let rendered = render(
//!     r#"{"@layout": [{"@isa": "UILabel", "@id": "title", "text": "Hi #{object.name}"}]}"#,
//!     &json!({"name": "Ada"}),
//! )
//! .unwrap();
//! assert!(rendered.handle("title").is_some());
//! ```

pub mod builder;
pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod layout;
pub mod palette;
pub mod parser;
pub mod template;
pub mod value;
pub mod view;

pub use config::{ConfigError, RenderConfig};
pub use document::{ConstraintSpec, Document, Node};
pub use engine::{DocumentEngine, Invalidator, Rendered};
pub use error::MarkupError;
pub use layout::{ConstraintDescriptor, LayoutConfig, SolvedFrames};
pub use palette::{Color, Palette};
pub use template::{BindingGraph, DataSource, TemplateString};
pub use value::{resolve_attribute, AttributeValue};
pub use view::{ViewHandle, ViewRegistry, ViewTree};

/// Render a JSON document with the standard view kinds and default configuration
///
/// # Example
///
/// ```rust
/// use latte::render;
/// use serde_json::json;
///
/// let rendered = render(
///     r##"{
///         "@layout": [
///             {"@isa": "UILabel", "@id": "l1", "text": "#{@bind(object.foo)}"},
///             {"@isa": "UILabel", "@id": "l2"}
///         ],
///         "@constraints": [
///             {"format": "H:|-margin-[l1(140)]-margin-[l2(80)]", "metrics": {"margin": 30}}
///         ]
///     }"##,
///     &json!({"foo": "X"}),
/// )
/// .unwrap();
///
/// assert_eq!(rendered.constraints()[0].to_string(), "l1.leading == superview.leading + 30");
/// assert_eq!(rendered.bindings().len(), 1);
/// ```
pub fn render(json: &str, data: &dyn DataSource) -> Result<Rendered, MarkupError> {
    DocumentEngine::new().render_str(json, data)
}

/// Render a JSON document with a custom configuration
pub fn render_with_config(
    json: &str,
    data: &dyn DataSource,
    config: RenderConfig,
) -> Result<Rendered, MarkupError> {
    DocumentEngine::new().with_config(config).render_str(json, data)
}
