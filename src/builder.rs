//! Node builder: turns document nodes into views
//!
//! Nodes are built depth-first in pre-order. Each node's view is attached to
//! its parent before its attributes are applied, its `@id` is recorded before
//! its children are built, and children are attached in document order.

use tracing::{debug, trace};

use crate::config::RenderConfig;
use crate::document::{Node, LAYOUT_KEY, SUBVIEWS_KEY};
use crate::error::MarkupError;
use crate::layout::find_similar;
use crate::template::{BindingGraph, DataSource};
use crate::value::{resolve_attribute, AttributeValue};
use crate::view::{IdEntry, IdTable, PropertyValue, View, ViewClass, ViewHandle, ViewRegistry, ViewTree};

/// Everything a finished build produced
#[derive(Debug)]
pub struct BuildOutput {
    pub tree: ViewTree,
    pub ids: IdTable,
    pub bindings: BindingGraph,
}

/// Builds view trees from document nodes
pub struct NodeBuilder<'a> {
    registry: &'a ViewRegistry,
    config: &'a RenderConfig,
    data: &'a dyn DataSource,
    tree: ViewTree,
    ids: IdTable,
    bindings: BindingGraph,
}

impl<'a> NodeBuilder<'a> {
    pub fn new(
        registry: &'a ViewRegistry,
        config: &'a RenderConfig,
        data: &'a dyn DataSource,
    ) -> Self {
        Self {
            registry,
            config,
            data,
            tree: ViewTree::new(),
            ids: IdTable::new(),
            bindings: BindingGraph::new(config.data_root.clone()),
        }
    }

    /// Build a top-level node list under the root container
    pub fn build_all(&mut self, nodes: &[Node]) -> Result<Vec<ViewHandle>, MarkupError> {
        let root = self.tree.root();
        nodes
            .iter()
            .enumerate()
            .map(|(i, node)| self.build(node, root, &format!("{}[{}]", LAYOUT_KEY, i)))
            .collect()
    }

    /// Build one node and its subtree under `parent`
    ///
    /// `key_path` names the node in the document and prefixes every error
    /// raised for it.
    pub fn build(
        &mut self,
        node: &Node,
        parent: ViewHandle,
        key_path: &str,
    ) -> Result<ViewHandle, MarkupError> {
        let registry = self.registry;
        let class = registry.get(&node.kind).ok_or_else(|| MarkupError::UnknownViewKind {
            key_path: key_path.to_string(),
            kind: node.kind.clone(),
            suggestions: find_similar(registry.kinds(), &node.kind, 2),
        })?;

        let handle = self
            .tree
            .insert(parent, node.kind.clone(), node.id.clone(), class.create());
        debug!(
            kind = %node.kind,
            id = node.id.as_deref().unwrap_or(""),
            key_path,
            "built node"
        );

        if let Some(id) = &node.id {
            let entry = IdEntry {
                handle,
                parent,
                key_path: key_path.to_string(),
            };
            self.ids
                .insert(id, entry)
                .map_err(|first| MarkupError::DuplicateIdentifier {
                    key_path: key_path.to_string(),
                    id: id.clone(),
                    first: first.key_path.clone(),
                })?;
        }

        for (name, raw) in &node.attributes {
            self.apply_attribute(class, handle, name, raw, &format!("{}.{}", key_path, name))?;
        }

        for (i, child) in node.children.iter().enumerate() {
            self.build(child, handle, &format!("{}.{}[{}]", key_path, SUBVIEWS_KEY, i))?;
        }

        Ok(handle)
    }

    fn apply_attribute(
        &mut self,
        class: &ViewClass,
        handle: ViewHandle,
        name: &str,
        raw: &serde_json::Value,
        key_path: &str,
    ) -> Result<(), MarkupError> {
        // Existence is checked first so a typo is reported as such, not as a bad value
        if !class.has_property(name) {
            return Err(unknown_property(class, name, key_path));
        }

        let value = resolve_attribute(raw, &self.config.palette).map_err(|e| e.at(key_path))?;
        let (property, live) = match value {
            AttributeValue::Literal(json) => (PropertyValue::Json(json), None),
            AttributeValue::ColorRef { color, .. } | AttributeValue::ColorHex { color, .. } => {
                (PropertyValue::Color(color), None)
            }
            AttributeValue::Template(template) => {
                let composed = self
                    .bindings
                    .compose(&template, self.data)
                    .map_err(|e| e.at(key_path))?;
                let live = template.is_live().then_some(template);
                (PropertyValue::Text(composed), live)
            }
        };

        trace!(key_path, value = %property.describe(), "applying attribute");
        if let Some(view) = self.tree.view_mut(handle) {
            apply_property(class, view, name, &property, key_path)?;
        }

        if let (Some(template), PropertyValue::Text(composed)) = (live, property) {
            self.bindings
                .register(handle, name, template, composed, key_path);
        }
        Ok(())
    }

    /// Consume the builder
    pub fn finish(self) -> BuildOutput {
        BuildOutput {
            tree: self.tree,
            ids: self.ids,
            bindings: self.bindings,
        }
    }
}

fn unknown_property(class: &ViewClass, name: &str, key_path: &str) -> MarkupError {
    let similar = find_similar(class.properties(), name, 2);
    let mut reason = format!("{} has no settable property '{}'", class.kind(), name);
    if !similar.is_empty() {
        reason.push_str(&format!(" (did you mean {}?)", similar.join(", ")));
    }
    MarkupError::UnsupportedAttribute {
        key_path: key_path.to_string(),
        kind: class.kind().to_string(),
        attribute: name.to_string(),
        reason,
    }
}

/// Run a class setter, mapping its failure to `UnsupportedAttribute`
pub(crate) fn apply_property(
    class: &ViewClass,
    view: &mut dyn View,
    name: &str,
    value: &PropertyValue,
    key_path: &str,
) -> Result<(), MarkupError> {
    match class.apply(view, name, value) {
        Some(Ok(())) => Ok(()),
        Some(Err(e)) => Err(MarkupError::UnsupportedAttribute {
            key_path: key_path.to_string(),
            kind: class.kind().to_string(),
            attribute: name.to_string(),
            reason: e.to_string(),
        }),
        None => Err(unknown_property(class, name, key_path)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::Color;
    use crate::view::standard::{ImageView, Label};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    fn build(node: Value, data: Value) -> Result<BuildOutput, MarkupError> {
        let registry = ViewRegistry::standard();
        let config = RenderConfig::default();
        let node: Node = serde_json::from_value(node).unwrap();
        let mut builder = NodeBuilder::new(&registry, &config, &data);
        builder.build_all(&[node])?;
        Ok(builder.finish())
    }

    #[test]
    fn test_builds_label_with_children() {
        let out = build(
            json!({
                "@isa": "UILabel",
                "@id": "l1",
                "backgroundColor": "@color-hex:00abb0",
                "text": "#{@bind(object.foo)}",
                "textColor": "@color:white",
                "@subviews": [{"@isa": "UIImageView", "@id": "image1", "frame": [0, 0, 10, 10]}]
            }),
            json!({"foo": "X"}),
        )
        .unwrap();

        assert_eq!(out.tree.outline(), "@root\n  UILabel#l1\n    UIImageView#image1\n");
        let l1 = out.ids.handle("l1").unwrap();
        let label = out.tree.view::<Label>(l1).unwrap();
        assert_eq!(label.text, "X");
        assert_eq!(label.base.background_color, Some(Color::rgb(0x00, 0xab, 0xb0)));
        assert_eq!(label.text_color, Some(Color::rgb(255, 255, 255)));

        let image1 = out.ids.get("image1").unwrap();
        assert_eq!(image1.parent, l1);
        assert_eq!(image1.key_path, "@layout[0].@subviews[0]");
        assert!(out.tree.view::<ImageView>(image1.handle).unwrap().base.frame.is_some());

        assert_eq!(out.bindings.len(), 1);
    }

    #[test]
    fn test_static_template_is_not_bound() {
        let out = build(
            json!({"@isa": "UILabel", "text": "Hi #{object.name}"}),
            json!({"name": "Ada"}),
        )
        .unwrap();
        assert!(out.bindings.is_empty());
    }

    #[test]
    fn test_unknown_kind_suggests() {
        let err = build(json!({"@isa": "UILabl"}), json!({})).unwrap_err();
        match err {
            MarkupError::UnknownViewKind {
                key_path,
                suggestions,
                ..
            } => {
                assert_eq!(key_path, "@layout[0]");
                assert_eq!(suggestions, vec!["UILabel"]);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_unsupported_attribute() {
        let err = build(json!({"@isa": "UIView", "txt": "hi"}), json!({})).unwrap_err();
        match err {
            MarkupError::UnsupportedAttribute {
                key_path, attribute, ..
            } => {
                assert_eq!(key_path, "@layout[0].txt");
                assert_eq!(attribute, "txt");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_setter_type_error_is_unsupported_attribute() {
        let err = build(json!({"@isa": "UIView", "hidden": "@color:red"}), json!({})).unwrap_err();
        match err {
            MarkupError::UnsupportedAttribute { reason, .. } => {
                assert!(reason.contains("expected a boolean"), "{}", reason)
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_nested_duplicate_id() {
        let err = build(
            json!({
                "@isa": "UIView",
                "@id": "x",
                "@subviews": [{"@isa": "UIView", "@subviews": [{"@isa": "UIView", "@id": "x"}]}]
            }),
            json!({}),
        )
        .unwrap_err();
        match err {
            MarkupError::DuplicateIdentifier {
                key_path, first, ..
            } => {
                assert_eq!(key_path, "@layout[0].@subviews[0].@subviews[0]");
                assert_eq!(first, "@layout[0]");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_color_error_carries_key_path() {
        let err = build(json!({"@isa": "UIView", "backgroundColor": "@color-hex:12"}), json!({})).unwrap_err();
        assert_eq!(err.key_path(), Some("@layout[0].backgroundColor"));
    }

    #[test]
    fn test_missing_binding_path() {
        let err = build(json!({"@isa": "UILabel", "text": "#{object.missing}"}), json!({})).unwrap_err();
        assert!(matches!(err, MarkupError::UnresolvedBindingPath { .. }));
        assert_eq!(err.key_path(), Some("@layout[0].text"));
    }
}
