//! View objects, the built view tree and typed property values
//!
//! The native toolkit is out of reach of this crate, so a view is any
//! `'static + Debug` value. Views are created and mutated only through the
//! capability table in [`ViewRegistry`]: a per-kind map from attribute name to
//! typed setter.

pub mod registry;
pub mod standard;

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

use serde_json::Value;
use thiserror::Error;

use crate::palette::Color;

pub use registry::{ClassBuilder, ViewClass, ViewRegistry};

/// A view instance owned by a [`ViewTree`]
pub trait View: Any + fmt::Debug {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any + fmt::Debug> View for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// The host container top-level nodes are attached to
#[derive(Debug, Default)]
pub struct RootView;

/// Copyable reference to a view in a [`ViewTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewHandle(usize);

impl ViewHandle {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for ViewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One built view and its place in the hierarchy
#[derive(Debug)]
pub struct ViewNode {
    pub kind: String,
    pub id: Option<String>,
    pub parent: Option<ViewHandle>,
    pub children: Vec<ViewHandle>,
    view: Box<dyn View>,
}

impl ViewNode {
    pub fn view(&self) -> &dyn View {
        &*self.view
    }
}

/// Arena of built views
///
/// Index 0 is always the root container. Children are kept in insertion
/// order, which is also their z/traversal order.
#[derive(Debug)]
pub struct ViewTree {
    nodes: Vec<ViewNode>,
}

/// Kind tag of the root container
pub const ROOT_KIND: &str = "@root";

impl ViewTree {
    pub fn new() -> Self {
        Self {
            nodes: vec![ViewNode {
                kind: ROOT_KIND.to_string(),
                id: None,
                parent: None,
                children: Vec::new(),
                view: Box::new(RootView),
            }],
        }
    }

    pub fn root(&self) -> ViewHandle {
        ViewHandle(0)
    }

    /// Attach a new view as the last child of `parent`
    ///
    /// # Panics
    ///
    /// Panics if `parent` does not belong to this tree.
    pub fn insert(
        &mut self,
        parent: ViewHandle,
        kind: impl Into<String>,
        id: Option<String>,
        view: Box<dyn View>,
    ) -> ViewHandle {
        let handle = ViewHandle(self.nodes.len());
        self.nodes.push(ViewNode {
            kind: kind.into(),
            id,
            parent: Some(parent),
            children: Vec::new(),
            view,
        });
        self.nodes[parent.0].children.push(handle);
        handle
    }

    pub fn node(&self, handle: ViewHandle) -> Option<&ViewNode> {
        self.nodes.get(handle.0)
    }

    /// Downcast the view behind `handle` to its concrete type
    pub fn view<V: View>(&self, handle: ViewHandle) -> Option<&V> {
        let node = self.nodes.get(handle.0)?;
        (*node.view).as_any().downcast_ref::<V>()
    }

    pub(crate) fn view_mut(&mut self, handle: ViewHandle) -> Option<&mut (dyn View + 'static)> {
        self.nodes.get_mut(handle.0).map(|node| &mut *node.view)
    }

    pub fn parent(&self, handle: ViewHandle) -> Option<ViewHandle> {
        self.nodes.get(handle.0).and_then(|n| n.parent)
    }

    pub fn children(&self, handle: ViewHandle) -> &[ViewHandle] {
        self.nodes
            .get(handle.0)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Number of views, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// All handles in depth-first pre-order, root first
    pub fn walk(&self) -> Vec<ViewHandle> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root()];
        while let Some(handle) = stack.pop() {
            order.push(handle);
            stack.extend(self.children(handle).iter().rev().copied());
        }
        order
    }

    /// Indented `kind#id` listing of the hierarchy
    pub fn outline(&self) -> String {
        let mut out = String::new();
        self.write_outline(self.root(), 0, &mut out);
        out
    }

    fn write_outline(&self, handle: ViewHandle, depth: usize, out: &mut String) {
        if let Some(node) = self.node(handle) {
            out.push_str(&"  ".repeat(depth));
            out.push_str(&node.kind);
            if let Some(id) = &node.id {
                out.push('#');
                out.push_str(id);
            }
            out.push('\n');
            for child in &node.children {
                self.write_outline(*child, depth + 1, out);
            }
        }
    }
}

impl Default for ViewTree {
    fn default() -> Self {
        Self::new()
    }
}

/// One entry of the identifier table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdEntry {
    pub handle: ViewHandle,
    pub parent: ViewHandle,
    /// Where the id was declared
    pub key_path: String,
}

/// Build-time map from declared `@id` to the built view
#[derive(Debug, Clone, Default)]
pub struct IdTable {
    entries: HashMap<String, IdEntry>,
}

impl IdTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an id, returning the existing entry if it was already declared
    pub fn insert(&mut self, id: &str, entry: IdEntry) -> Result<(), &IdEntry> {
        if self.entries.contains_key(id) {
            return Err(&self.entries[id]);
        }
        self.entries.insert(id.to_string(), entry);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&IdEntry> {
        self.entries.get(id)
    }

    pub fn handle(&self, id: &str) -> Option<ViewHandle> {
        self.entries.get(id).map(|e| e.handle)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Declared ids, sorted
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.entries.keys().map(|k| k.as_str()).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Value handed to a property setter
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// Composed template text
    Text(String),
    Color(Color),
    /// Any other JSON literal, shape preserved
    Json(Value),
}

/// A setter could not convert the value it was given
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PropertyError {
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: String,
    },
    #[error("value {value} out of range: {reason}")]
    OutOfRange { value: String, reason: String },
    #[error("setter registered for a different view type")]
    WrongViewType,
}

impl PropertyValue {
    fn mismatch(&self, expected: &'static str) -> PropertyError {
        PropertyError::TypeMismatch {
            expected,
            found: self.describe(),
        }
    }

    /// Short description used in error messages
    pub fn describe(&self) -> String {
        match self {
            Self::Text(s) => format!("text \"{}\"", s),
            Self::Color(c) => format!("color {}", c),
            Self::Json(v) => format!("{} {}", json_kind(v), v),
        }
    }

    pub fn as_str(&self) -> Result<&str, PropertyError> {
        match self {
            Self::Text(s) => Ok(s),
            Self::Json(Value::String(s)) => Ok(s),
            _ => Err(self.mismatch("a string")),
        }
    }

    /// Numbers, or text that parses as a number
    pub fn as_f64(&self) -> Result<f64, PropertyError> {
        match self {
            Self::Json(Value::Number(n)) => n.as_f64().ok_or_else(|| self.mismatch("a number")),
            Self::Text(s) => s.trim().parse().map_err(|_| self.mismatch("a number")),
            _ => Err(self.mismatch("a number")),
        }
    }

    pub fn as_i64(&self) -> Result<i64, PropertyError> {
        match self {
            Self::Json(Value::Number(n)) => n.as_i64().ok_or_else(|| self.mismatch("an integer")),
            Self::Text(s) => s.trim().parse().map_err(|_| self.mismatch("an integer")),
            _ => Err(self.mismatch("an integer")),
        }
    }

    /// Booleans; `0`/`1` and `"true"`/`"false"` are accepted too
    pub fn as_bool(&self) -> Result<bool, PropertyError> {
        match self {
            Self::Json(Value::Bool(b)) => Ok(*b),
            Self::Json(Value::Number(n)) => match n.as_i64() {
                Some(0) => Ok(false),
                Some(1) => Ok(true),
                _ => Err(self.mismatch("a boolean")),
            },
            Self::Text(s) => match s.trim() {
                "true" | "YES" => Ok(true),
                "false" | "NO" => Ok(false),
                _ => Err(self.mismatch("a boolean")),
            },
            _ => Err(self.mismatch("a boolean")),
        }
    }

    pub fn as_color(&self) -> Result<Color, PropertyError> {
        match self {
            Self::Color(c) => Ok(*c),
            _ => Err(self.mismatch("a color")),
        }
    }

    /// `[x, y, width, height]` or `{"x":..,"y":..,"width":..,"height":..}`
    pub fn as_rect(&self) -> Result<Rect, PropertyError> {
        let number = |v: Option<&Value>| v.and_then(Value::as_f64);
        let parts = match self {
            Self::Json(Value::Array(items)) if items.len() == 4 => [
                number(items.first()),
                number(items.get(1)),
                number(items.get(2)),
                number(items.get(3)),
            ],
            Self::Json(Value::Object(map)) => [
                number(map.get("x")),
                number(map.get("y")),
                number(map.get("width")),
                number(map.get("height")),
            ],
            _ => return Err(self.mismatch("a rect [x, y, width, height]")),
        };
        match parts {
            [Some(x), Some(y), Some(width), Some(height)] => Ok(Rect::new(x, y, width, height)),
            _ => Err(self.mismatch("a rect [x, y, width, height]")),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Default, PartialEq)]
    struct Dummy(u32);

    #[test]
    fn test_tree_insertion_order_and_parents() {
        let mut tree = ViewTree::new();
        let root = tree.root();
        let a = tree.insert(root, "A", Some("a".into()), Box::new(Dummy(1)));
        let b = tree.insert(root, "B", None, Box::new(Dummy(2)));
        let c = tree.insert(a, "C", None, Box::new(Dummy(3)));

        assert_eq!(tree.children(root), &[a, b]);
        assert_eq!(tree.parent(c), Some(a));
        assert_eq!(tree.walk(), vec![root, a, c, b]);
        assert_eq!(tree.view::<Dummy>(c), Some(&Dummy(3)));
        assert!(tree.view::<RootView>(c).is_none());
        assert_eq!(tree.outline(), "@root\n  A#a\n    C\n  B\n");
    }

    #[test]
    fn test_view_mut_downcasts_concrete_type() {
        let mut tree = ViewTree::new();
        let a = tree.insert(tree.root(), "A", None, Box::new(Dummy(1)));
        if let Some(view) = tree.view_mut(a) {
            if let Some(dummy) = view.as_any_mut().downcast_mut::<Dummy>() {
                dummy.0 = 9;
            }
        }
        assert_eq!(tree.view::<Dummy>(a), Some(&Dummy(9)));
    }

    #[test]
    fn test_id_table_rejects_duplicates() {
        let tree = ViewTree::new();
        let entry = IdEntry {
            handle: tree.root(),
            parent: tree.root(),
            key_path: "@layout[0]".into(),
        };
        let mut ids = IdTable::new();
        assert!(ids.insert("l1", entry.clone()).is_ok());
        let existing = ids.insert("l1", entry).unwrap_err();
        assert_eq!(existing.key_path, "@layout[0]");
        assert_eq!(ids.ids(), vec!["l1"]);
    }

    #[test]
    fn test_property_conversions() {
        assert_eq!(PropertyValue::Json(json!(8)).as_f64(), Ok(8.0));
        assert_eq!(PropertyValue::Text("2.5".into()).as_f64(), Ok(2.5));
        assert_eq!(PropertyValue::Json(json!(false)).as_bool(), Ok(false));
        assert_eq!(PropertyValue::Json(json!(1)).as_bool(), Ok(true));
        assert_eq!(PropertyValue::Json(json!(1)).as_i64(), Ok(1));
        assert!(PropertyValue::Json(json!("x")).as_f64().is_err());
        assert!(PropertyValue::Text("hi".into()).as_color().is_err());
    }

    #[test]
    fn test_rect_from_array_and_object() {
        assert_eq!(
            PropertyValue::Json(json!([0, 0, 10, 10])).as_rect(),
            Ok(Rect::new(0.0, 0.0, 10.0, 10.0))
        );
        assert_eq!(
            PropertyValue::Json(json!({"x": 1, "y": 2, "width": 3, "height": 4})).as_rect(),
            Ok(Rect::new(1.0, 2.0, 3.0, 4.0))
        );
        assert!(PropertyValue::Json(json!([0, 0, 10])).as_rect().is_err());
    }
}
