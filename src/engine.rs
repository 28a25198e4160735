//! Document engine: drives a whole build and owns the result
//!
//! A render is atomic. Any error aborts it and nothing built so far is
//! returned; the host either gets a complete [`Rendered`] or an error.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

use tracing::{debug, info};

use crate::builder::{apply_property, NodeBuilder};
use crate::config::RenderConfig;
use crate::document::{Document, CONSTRAINTS_KEY};
use crate::error::MarkupError;
use crate::layout::{resolve_constraint, solve_frames, ConstraintDescriptor, SolvedFrames, SolverError};
use crate::template::{BindingGraph, BindingUpdate, DataSource};
use crate::view::{IdTable, PropertyValue, View, ViewHandle, ViewRegistry, ViewTree};

/// Builds documents against a view registry and a configuration
#[derive(Debug, Clone)]
pub struct DocumentEngine {
    registry: Arc<ViewRegistry>,
    config: RenderConfig,
}

impl Default for DocumentEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentEngine {
    /// An engine with the standard view kinds and default configuration
    pub fn new() -> Self {
        Self::with_registry(ViewRegistry::standard())
    }

    pub fn with_registry(registry: ViewRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            config: RenderConfig::default(),
        }
    }

    pub fn with_config(mut self, config: RenderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn registry(&self) -> &ViewRegistry {
        &self.registry
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Build every `@layout` node and resolve every `@constraints` entry
    pub fn render(&self, document: &Document, data: &dyn DataSource) -> Result<Rendered, MarkupError> {
        let mut builder = NodeBuilder::new(&self.registry, &self.config, data);
        builder.build_all(&document.layout)?;
        let built = builder.finish();

        let mut constraints = Vec::new();
        for (i, spec) in document.constraints.iter().enumerate() {
            let resolved = resolve_constraint(spec, &built.ids, &self.config.layout)
                .map_err(|e| e.at(format!("{}[{}]", CONSTRAINTS_KEY, i)))?;
            constraints.extend(resolved);
        }

        info!(
            views = built.tree.len() - 1,
            constraints = constraints.len(),
            bindings = built.bindings.len(),
            "rendered document"
        );

        let (pending_tx, pending_rx) = mpsc::channel();
        Ok(Rendered {
            registry: Arc::clone(&self.registry),
            tree: built.tree,
            ids: built.ids,
            constraints,
            bindings: built.bindings,
            pending_tx,
            pending_rx,
        })
    }

    /// Parse a JSON document and render it
    pub fn render_str(&self, json: &str, data: &dyn DataSource) -> Result<Rendered, MarkupError> {
        let document = Document::from_str(json)?;
        self.render(&document, data)
    }
}

/// A built document: the view tree, its identifiers, the resolved
/// constraints and the live bindings
///
/// The host owns this for as long as the views are displayed. Bindings are
/// recomposed by calling [`Rendered::invalidate`] from the thread that owns
/// it; other threads queue paths through an [`Invalidator`].
#[derive(Debug)]
pub struct Rendered {
    registry: Arc<ViewRegistry>,
    tree: ViewTree,
    ids: IdTable,
    constraints: Vec<ConstraintDescriptor>,
    bindings: BindingGraph,
    pending_tx: Sender<String>,
    pending_rx: Receiver<String>,
}

impl Rendered {
    /// The host container every top-level view hangs off
    pub fn root(&self) -> ViewHandle {
        self.tree.root()
    }

    pub fn tree(&self) -> &ViewTree {
        &self.tree
    }

    pub fn ids(&self) -> &IdTable {
        &self.ids
    }

    /// Constraint descriptors, in `@constraints` order
    pub fn constraints(&self) -> &[ConstraintDescriptor] {
        &self.constraints
    }

    pub fn bindings(&self) -> &BindingGraph {
        &self.bindings
    }

    pub fn handle(&self, id: &str) -> Option<ViewHandle> {
        self.ids.handle(id)
    }

    /// Look up an identified view as a concrete type
    pub fn view_by_id<V: View>(&self, id: &str) -> Option<&V> {
        self.tree.view::<V>(self.ids.handle(id)?)
    }

    /// Recompose and reapply every binding that depends on `path`
    ///
    /// Unchanged values are reported but not reapplied. Failures are per
    /// binding: one bad binding does not stop the others. A value the view
    /// rejects is not recorded, so the next invalidation tries it again.
    pub fn invalidate(
        &mut self,
        path: &str,
        data: &dyn DataSource,
    ) -> Vec<Result<BindingUpdate, MarkupError>> {
        let results = self.bindings.recompose(path, data);
        results
            .into_iter()
            .map(|result| {
                let update = result?;
                if update.changed {
                    self.apply_update(&update)?;
                    self.bindings.commit(update.binding, update.value.clone());
                }
                Ok(update)
            })
            .collect()
    }

    fn apply_update(&mut self, update: &BindingUpdate) -> Result<(), MarkupError> {
        let key_path = self
            .bindings
            .get(update.binding)
            .map(|b| b.key_path.clone())
            .unwrap_or_default();
        let kind = match self.tree.node(update.target) {
            Some(node) => node.kind.clone(),
            None => return Ok(()),
        };
        let Some(class) = self.registry.get(&kind) else {
            return Ok(());
        };
        let Some(view) = self.tree.view_mut(update.target) else {
            return Ok(());
        };
        debug!(key_path = %key_path, value = %update.value, "reapplying binding");
        apply_property(
            class,
            view,
            &update.attribute,
            &PropertyValue::Text(update.value.clone()),
            &key_path,
        )
    }

    /// A handle other threads can use to request invalidation
    pub fn invalidator(&self) -> Invalidator {
        Invalidator {
            tx: self.pending_tx.clone(),
        }
    }

    /// Drain queued invalidation requests, in the order they were sent
    ///
    /// Paths queued more than once since the last drain are invalidated once.
    pub fn process_pending(&mut self, data: &dyn DataSource) -> Vec<Result<BindingUpdate, MarkupError>> {
        let mut paths: Vec<String> = Vec::new();
        for path in self.pending_rx.try_iter() {
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
        paths
            .iter()
            .flat_map(|path| self.invalidate(path, data))
            .collect()
    }

    /// Preview frames with the reference solver in a `width` x `height` container
    pub fn solve_frames(&self, width: f64, height: f64) -> Result<SolvedFrames, SolverError> {
        solve_frames(&self.tree, &self.ids, &self.constraints, width, height)
    }

    /// Hand the view tree and constraints over to the host
    pub fn into_parts(self) -> (ViewTree, Vec<ConstraintDescriptor>) {
        (self.tree, self.constraints)
    }
}

/// Queues invalidation requests for a [`Rendered`] document
///
/// Cloneable and `Send`, so data producers on other threads can signal
/// changes; the owner applies them with [`Rendered::process_pending`].
#[derive(Debug, Clone)]
pub struct Invalidator {
    tx: Sender<String>,
}

impl Invalidator {
    /// Queue a path; returns false once the document has been dropped
    pub fn invalidate(&self, path: impl Into<String>) -> bool {
        self.tx.send(path.into()).is_ok()
    }
}
