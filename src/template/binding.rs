//! Dependency tracking between data paths and bound view attributes

use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::MarkupError;
use crate::view::ViewHandle;

use super::data::DataSource;
use super::interpolate::{resolve_path, BindingPath, TemplateString};

/// Index of a binding in its graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingId(usize);

impl BindingId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// A live template attached to one view attribute
#[derive(Debug, Clone)]
pub struct Binding {
    pub target: ViewHandle,
    pub attribute: String,
    pub template: TemplateString,
    /// Document location, for error reports during invalidation
    pub key_path: String,
    composed: String,
}

impl Binding {
    /// The most recently composed value
    pub fn composed(&self) -> &str {
        &self.composed
    }
}

/// Result of recomposing one binding
#[derive(Debug, Clone, PartialEq)]
pub struct BindingUpdate {
    pub binding: BindingId,
    pub target: ViewHandle,
    pub attribute: String,
    pub value: String,
    /// False when the recomposed value equals the previous composition
    pub changed: bool,
}

/// Maps data paths to the bindings that depend on them
///
/// Edges point from a normalized path key to binding ids, never to views or
/// templates directly, so the graph holds no references into the view tree.
/// Only explicit (`@bind`) expressions create edges; implicit expressions
/// sharing a template with an explicit one are recomposed along with it.
#[derive(Debug, Clone)]
pub struct BindingGraph {
    root: String,
    bindings: Vec<Binding>,
    edges: HashMap<String, Vec<BindingId>>,
}

impl BindingGraph {
    /// Create an empty graph; `root` is the name expressions use for the data object
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            bindings: Vec::new(),
            edges: HashMap::new(),
        }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// Register a template for live invalidation
    ///
    /// Returns `None` for templates without explicit expressions; those are
    /// evaluated once and never tracked.
    pub fn register(
        &mut self,
        target: ViewHandle,
        attribute: impl Into<String>,
        template: TemplateString,
        composed: impl Into<String>,
        key_path: impl Into<String>,
    ) -> Option<BindingId> {
        if !template.is_live() {
            return None;
        }

        let id = BindingId(self.bindings.len());
        for path in template.live_paths() {
            let dependents = self.edges.entry(path.key(&self.root)).or_default();
            if !dependents.contains(&id) {
                dependents.push(id);
            }
        }

        let attribute = attribute.into();
        debug!(
            binding = id.0,
            view = %target,
            attribute = %attribute,
            "registered live binding"
        );
        self.bindings.push(Binding {
            target,
            attribute,
            template,
            key_path: key_path.into(),
            composed: composed.into(),
        });
        Some(id)
    }

    /// Read the current value at `path` off the data object
    pub fn resolve(&self, path: &BindingPath, data: &dyn DataSource) -> Result<Value, MarkupError> {
        resolve_path(path, data, &self.root)
    }

    /// Compose a template against the data object using this graph's root name
    pub fn compose(
        &self,
        template: &TemplateString,
        data: &dyn DataSource,
    ) -> Result<String, MarkupError> {
        template.compose(data, &self.root)
    }

    /// Bindings affected by a change at `path`, in registration order
    ///
    /// A change to a path also affects everything bound below it, so
    /// `object.user` reaches bindings on `object.user.name`.
    pub fn dependents(&self, path: &str) -> Result<Vec<BindingId>, MarkupError> {
        let key = BindingPath::parse(path)?.key(&self.root);
        let mut ids: Vec<BindingId> = self
            .edges
            .iter()
            .filter(|(bound, _)| is_within(bound, &key))
            .flat_map(|(_, ids)| ids.iter().copied())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        Ok(ids)
    }

    /// Recompose every binding that depends on `path` and keep the results
    ///
    /// Each affected template is recomposed as a whole, implicit expressions
    /// included. A binding that fails to recompose keeps its previous value
    /// and is reported on its own; the others still update.
    pub fn invalidate(
        &mut self,
        path: &str,
        data: &dyn DataSource,
    ) -> Vec<Result<BindingUpdate, MarkupError>> {
        let results = self.recompose(path, data);
        for update in results.iter().flatten() {
            self.commit(update.binding, update.value.clone());
        }
        results
    }

    /// Recompose every binding that depends on `path` without recording it
    ///
    /// `changed` compares against the last committed value. Callers that
    /// apply the update somewhere commit it with [`BindingGraph::commit`]
    /// once that succeeded, so a rejected value is retried next time.
    pub fn recompose(
        &self,
        path: &str,
        data: &dyn DataSource,
    ) -> Vec<Result<BindingUpdate, MarkupError>> {
        let ids = match self.dependents(path) {
            Ok(ids) => ids,
            Err(e) => return vec![Err(e)],
        };
        debug!(path, dependents = ids.len(), "invalidating");

        ids.into_iter()
            .map(|id| {
                let binding = &self.bindings[id.0];
                match binding.template.compose(data, &self.root) {
                    Ok(value) => Ok(BindingUpdate {
                        binding: id,
                        target: binding.target,
                        attribute: binding.attribute.clone(),
                        changed: value != binding.composed,
                        value,
                    }),
                    Err(e) => {
                        warn!(binding = id.0, error = %e, "binding could not be recomposed");
                        Err(e.at(binding.key_path.clone()))
                    }
                }
            })
            .collect()
    }

    /// Record `value` as the current composition of a binding
    pub fn commit(&mut self, id: BindingId, value: String) {
        if let Some(binding) = self.bindings.get_mut(id.0) {
            binding.composed = value;
        }
    }

    pub fn get(&self, id: BindingId) -> Option<&Binding> {
        self.bindings.get(id.0)
    }

    pub fn bindings(&self) -> impl Iterator<Item = (BindingId, &Binding)> {
        self.bindings.iter().enumerate().map(|(i, b)| (BindingId(i), b))
    }

    /// Normalized path keys with at least one dependent, sorted
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.edges.keys().map(|k| k.as_str()).collect();
        paths.sort_unstable();
        paths
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl Default for BindingGraph {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_DATA_ROOT)
    }
}

/// Whether a binding on `bound` is affected by a change at `changed`
///
/// True when either path lies at or below the other. A binding on an
/// ancestor composes the whole subtree, so it changes with any descendant.
fn is_within(bound: &str, changed: &str) -> bool {
    changed.is_empty()
        || bound.is_empty()
        || is_below(bound, changed)
        || is_below(changed, bound)
}

fn is_below(path: &str, prefix: &str) -> bool {
    path == prefix
        || (path.starts_with(prefix) && path.as_bytes().get(prefix.len()) == Some(&b'.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::ViewTree;
    use serde_json::json;

    fn handle() -> ViewHandle {
        ViewTree::new().root()
    }

    fn graph_with(template: &str, data: &Value) -> (BindingGraph, Option<BindingId>) {
        let mut graph = BindingGraph::new("object");
        let template = TemplateString::parse(template).unwrap();
        let composed = graph.compose(&template, data).unwrap();
        let id = graph.register(handle(), "text", template, composed, "@layout[0].text");
        (graph, id)
    }

    #[test]
    fn test_implicit_only_template_is_not_registered() {
        let (graph, id) = graph_with("Hi #{object.foo}", &json!({"foo": "X"}));
        assert!(id.is_none());
        assert!(graph.is_empty());
        assert!(graph.paths().is_empty());
    }

    #[test]
    fn test_mixed_template_recomposes_whole_string() {
        let mut data = json!({"foo": "X", "bar": "Y"});
        let (mut graph, id) = graph_with("Hello #{object.foo} and #{@bind(object.bar)}", &data);
        let id = id.unwrap();
        assert_eq!(graph.get(id).unwrap().composed(), "Hello X and Y");
        assert_eq!(graph.paths(), vec!["bar"]);

        data["bar"] = json!("Z");
        data["foo"] = json!("W");
        let results = graph.invalidate("object.bar", &data);
        assert_eq!(results.len(), 1);
        let update = results[0].as_ref().unwrap();
        assert_eq!(update.value, "Hello W and Z");
        assert!(update.changed);
    }

    #[test]
    fn test_implicit_path_never_fires_alone() {
        let data = json!({"foo": "X", "bar": "Y"});
        let (mut graph, _) = graph_with("Hello #{object.foo} and #{@bind(object.bar)}", &data);
        assert!(graph.invalidate("object.foo", &data).is_empty());
    }

    #[test]
    fn test_reinvalidation_is_idempotent() {
        let data = json!({"bar": "Y"});
        let (mut graph, _) = graph_with("#{@bind(object.bar)}!", &data);
        let first = graph.invalidate("object.bar", &data);
        let second = graph.invalidate("object.bar", &data);
        let first = first[0].as_ref().unwrap();
        let second = second[0].as_ref().unwrap();
        assert_eq!(first.value, second.value);
        assert!(!second.changed);
    }

    #[test]
    fn test_parent_path_reaches_nested_bindings() {
        let data = json!({"user": {"name": "Ada"}});
        let (mut graph, _) = graph_with("#{@bind(object.user.name)}", &data);
        assert_eq!(graph.invalidate("object.user", &data).len(), 1);
        assert_eq!(graph.invalidate("object", &data).len(), 1);
        assert!(graph.invalidate("object.username", &data).is_empty());
    }

    #[test]
    fn test_path_without_root_prefix_matches() {
        let data = json!({"bar": "Y"});
        let (mut graph, _) = graph_with("#{@bind(object.bar)}", &data);
        assert_eq!(graph.invalidate("bar", &data).len(), 1);
    }

    #[test]
    fn test_broken_binding_is_reported_not_fatal() {
        let data = json!({"bar": "Y"});
        let (mut graph, id) = graph_with("#{@bind(object.bar)}", &data);
        let results = graph.invalidate("object.bar", &json!({}));
        assert_eq!(results.len(), 1);
        let err = results[0].as_ref().unwrap_err();
        assert!(matches!(err, MarkupError::UnresolvedBindingPath { .. }));
        assert_eq!(err.key_path(), Some("@layout[0].text"));
        // The previous composition is kept
        assert_eq!(graph.get(id.unwrap()).unwrap().composed(), "Y");
    }

    #[test]
    fn test_resolve_reads_current_value() {
        let graph = BindingGraph::new("object");
        let path = BindingPath::parse("object.count").unwrap();
        assert_eq!(graph.resolve(&path, &json!({"count": 4})).unwrap(), json!(4));
        assert!(graph.resolve(&path, &json!({})).is_err());
    }

    #[test]
    fn test_is_within() {
        assert!(is_within("user.name", "user"));
        assert!(is_within("user", "user"));
        assert!(is_within("user", ""));
        assert!(!is_within("username", "user"));
        assert!(!is_within("user", "username"));
        assert!(is_within("", "user.name"));
    }

    #[test]
    fn test_ancestor_binding_follows_descendant_change() {
        let mut data = json!({"user": {"name": "Ada"}});
        let (mut graph, id) = graph_with("#{@bind(object.user)}", &data);
        assert_eq!(graph.dependents("object.user.name").unwrap(), vec![id.unwrap()]);

        data["user"]["name"] = json!("Grace");
        let results = graph.invalidate("object.user.name", &data);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].as_ref().unwrap().value, r#"{"name":"Grace"}"#);
    }

    #[test]
    fn test_recompose_leaves_composition_until_commit() {
        let data = json!({"bar": "Y"});
        let (mut graph, id) = graph_with("#{@bind(object.bar)}", &data);
        let id = id.unwrap();
        let changed = json!({"bar": "Z"});

        let first = graph.recompose("object.bar", &changed);
        assert!(first[0].as_ref().unwrap().changed);
        assert_eq!(graph.get(id).unwrap().composed(), "Y");

        // Still reported as a change while nothing was committed
        let second = graph.recompose("object.bar", &changed);
        assert!(second[0].as_ref().unwrap().changed);

        graph.commit(id, "Z".to_string());
        let third = graph.recompose("object.bar", &changed);
        assert!(!third[0].as_ref().unwrap().changed);
    }
}
