//! Template strings and live data bindings
//!
//! Every plain string attribute is scanned for `#{...}` expressions. An
//! expression is either a bare dotted path (`#{object.title}`), evaluated when
//! the view is built, or an explicit binding (`#{@bind(object.title)}`), which
//! registers the attribute in the [`BindingGraph`] so it is recomposed when the
//! host invalidates that path.
//!
//! # Example
//!
//! ```rust
//! use latte::template::{BindingGraph, TemplateString};
//! use latte::view::ViewTree;
//! use serde_json::json;
//!
//! let tree = ViewTree::new();
//! let mut graph = BindingGraph::new("object");
//! let mut data = json!({"foo": "X", "bar": "Y"});
//!
//! let template = TemplateString::parse("Hello #{object.foo} and #{@bind(object.bar)}").unwrap();
//! let composed = graph.compose(&template, &data).unwrap();
//! assert_eq!(composed, "Hello X and Y");
//! graph.register(tree.root(), "text", template, composed, "text");
//!
//! data["bar"] = json!("Z");
//! let updates = graph.invalidate("object.bar", &data);
//! assert_eq!(updates[0].as_ref().unwrap().value, "Hello X and Z");
//! ```

mod binding;
mod data;
mod interpolate;

pub use binding::{Binding, BindingGraph, BindingId, BindingUpdate};
pub use data::DataSource;
pub use interpolate::{
    push_value_text, resolve_path, BindMode, BindingExpression, BindingPath, Segment,
    TemplateString, BIND_CALL, EXPRESSION_CLOSE, EXPRESSION_OPEN,
};
