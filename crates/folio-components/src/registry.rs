//! Component registry.
//!
//! Maps component names to a factory and a property schema. Each entry
//! materializes its component on first [`ComponentRegistry::load`] and reuses
//! it for the rest of the process.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::builtin;
use crate::component::Component;
use crate::schema::{PropSchema, PropType, Validation};

type Loader = Box<dyn Fn() -> Arc<dyn Component> + Send + Sync>;

/// Registry entry.
pub struct ComponentDefinition {
    name: String,
    description: String,
    schema: PropSchema,
    loader: Loader,
    instance: OnceLock<Arc<dyn Component>>,
}

impl ComponentDefinition {
    /// Create a definition with a factory.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        schema: PropSchema,
        loader: impl Fn() -> Arc<dyn Component> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            schema,
            loader: Box::new(loader),
            instance: OnceLock::new(),
        }
    }

    /// Component name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human-readable description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Property schema.
    #[must_use]
    pub fn schema(&self) -> &PropSchema {
        &self.schema
    }

    /// Whether the component has been materialized.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.instance.get().is_some()
    }

    /// Materialize the component (at most once) and return it.
    pub fn load(&self) -> Arc<dyn Component> {
        let instance = self.instance.get_or_init(|| {
            tracing::debug!(component = %self.name, "Loading component");
            (self.loader)()
        });
        Arc::clone(instance)
    }

    /// Documentation for this entry.
    #[must_use]
    pub fn docs(&self) -> ComponentDocs {
        ComponentDocs {
            name: self.name.clone(),
            description: self.description.clone(),
            props: self
                .schema
                .iter()
                .map(|(name, spec)| PropDoc {
                    name: name.to_owned(),
                    prop_type: spec.prop_type,
                    required: spec.required,
                    default: spec.default.clone(),
                    description: spec.description.to_owned(),
                })
                .collect(),
        }
    }
}

impl std::fmt::Debug for ComponentDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentDefinition")
            .field("name", &self.name)
            .field("loaded", &self.is_loaded())
            .finish_non_exhaustive()
    }
}

/// Documentation of one component.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentDocs {
    /// Component name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Properties in declaration order.
    pub props: Vec<PropDoc>,
}

/// Documentation of one property.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropDoc {
    /// Property name.
    pub name: String,
    /// Declared type.
    #[serde(rename = "type")]
    pub prop_type: PropType,
    /// Whether the property is required.
    pub required: bool,
    /// Default value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Description.
    pub description: String,
}

/// Name to [`ComponentDefinition`] mapping.
///
/// # Example
///
/// ```
/// use folio_components::ComponentRegistry;
///
/// let registry = ComponentRegistry::with_builtins();
/// let validation = registry.validate("Avatar", &serde_json::Map::new());
/// assert!(!validation.valid);
/// assert!(registry.load("Avatar").is_some());
/// ```
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    entries: HashMap<String, ComponentDefinition>,
}

impl ComponentRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in components.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for definition in builtin::definitions() {
            registry.register(definition);
        }
        registry
    }

    /// Add a definition, replacing any entry with the same name.
    pub fn register(&mut self, definition: ComponentDefinition) {
        if self.entries.contains_key(definition.name()) {
            tracing::warn!(
                component = %definition.name(),
                "Component registered twice; the later definition replaces the earlier one"
            );
        }
        self.entries.insert(definition.name.clone(), definition);
    }

    /// Look up a definition.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ComponentDefinition> {
        self.entries.get(name)
    }

    /// Validate resolved properties for a component.
    #[must_use]
    pub fn validate(&self, name: &str, props: &Map<String, Value>) -> Validation {
        match self.get(name) {
            Some(definition) => definition.schema.validate(name, props),
            None => Validation::not_found(name),
        }
    }

    /// Materialize a component. `None` when the name is not registered.
    #[must_use]
    pub fn load(&self, name: &str) -> Option<Arc<dyn Component>> {
        let Some(definition) = self.get(name) else {
            tracing::warn!(component = name, "Component {name} not found in registry");
            return None;
        };
        Some(definition.load())
    }

    /// Documentation for a component.
    #[must_use]
    pub fn docs(&self, name: &str) -> Option<ComponentDocs> {
        self.get(name).map(ComponentDefinition::docs)
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
