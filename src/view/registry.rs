//! Registry of view classes: kind tag -> factory + typed property setters

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

use super::{PropertyError, PropertyValue, View};

type Factory = Box<dyn Fn() -> Box<dyn View> + Send + Sync>;

/// Type-erased setter for one named property
pub type Setter = Box<dyn Fn(&mut dyn View, &PropertyValue) -> Result<(), PropertyError> + Send + Sync>;

/// A registered view kind and the properties it exposes
pub struct ViewClass {
    kind: String,
    factory: Factory,
    setters: HashMap<String, Setter>,
}

impl ViewClass {
    /// Start describing a class whose instances are `V::default()`
    pub fn builder<V: View + Default>(kind: impl Into<String>) -> ClassBuilder<V> {
        ClassBuilder {
            class: ViewClass {
                kind: kind.into(),
                factory: Box::new(|| Box::new(V::default())),
                setters: HashMap::new(),
            },
            _view: PhantomData,
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Instantiate a fresh view
    pub fn create(&self) -> Box<dyn View> {
        (self.factory)()
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.setters.contains_key(name)
    }

    /// Settable property names, sorted
    pub fn properties(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.setters.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Apply a value through the named setter
    ///
    /// Returns `None` when the class has no such property.
    pub fn apply(
        &self,
        view: &mut dyn View,
        name: &str,
        value: &PropertyValue,
    ) -> Option<Result<(), PropertyError>> {
        self.setters.get(name).map(|setter| setter(view, value))
    }
}

impl fmt::Debug for ViewClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewClass")
            .field("kind", &self.kind)
            .field("properties", &self.properties())
            .finish()
    }
}

/// Builds a [`ViewClass`] with setters typed against the concrete view `V`
pub struct ClassBuilder<V> {
    class: ViewClass,
    _view: PhantomData<fn() -> V>,
}

impl<V: View> ClassBuilder<V> {
    /// Register a setter for `name`
    pub fn property<F>(mut self, name: impl Into<String>, setter: F) -> Self
    where
        F: Fn(&mut V, &PropertyValue) -> Result<(), PropertyError> + Send + Sync + 'static,
    {
        let erased: Setter = Box::new(move |view: &mut dyn View, value: &PropertyValue| {
            let view = view
                .as_any_mut()
                .downcast_mut::<V>()
                .ok_or(PropertyError::WrongViewType)?;
            setter(view, value)
        });
        self.class.setters.insert(name.into(), erased);
        self
    }

    /// Replace the default factory
    pub fn factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> V + Send + Sync + 'static,
    {
        self.class.factory = Box::new(move || Box::new(factory()));
        self
    }

    pub fn build(self) -> ViewClass {
        self.class
    }
}

/// Registry for view classes, keyed by kind tag
#[derive(Debug, Default)]
pub struct ViewRegistry {
    classes: HashMap<String, ViewClass>,
}

impl ViewRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a class, returning the one it replaces
    pub fn register(&mut self, class: ViewClass) -> Option<ViewClass> {
        self.classes.insert(class.kind.clone(), class)
    }

    /// Builder-style [`register`](Self::register)
    pub fn with_class(mut self, class: ViewClass) -> Self {
        self.register(class);
        self
    }

    /// Get a class by kind tag
    pub fn get(&self, kind: &str) -> Option<&ViewClass> {
        self.classes.get(kind)
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.classes.contains_key(kind)
    }

    /// Registered kind tags, sorted
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.classes.keys().map(|k| k.as_str()).collect();
        kinds.sort_unstable();
        kinds
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
