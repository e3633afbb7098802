//! Process-wide component registry.

use std::sync::{Arc, PoisonError, RwLock};

use crate::ComponentRegistry;

static GLOBAL: RwLock<Option<Arc<ComponentRegistry>>> = RwLock::new(None);

/// Install the process-wide registry.
///
/// The first installed registry stays in place until [`reset_global`]; later
/// calls return the existing instance.
pub fn init_global(registry: ComponentRegistry) -> Arc<ComponentRegistry> {
    let mut slot = GLOBAL.write().unwrap_or_else(PoisonError::into_inner);
    if let Some(existing) = slot.as_ref() {
        tracing::debug!("Global component registry already initialized");
        return Arc::clone(existing);
    }
    let registry = Arc::new(registry);
    *slot = Some(Arc::clone(&registry));
    registry
}

/// Get the process-wide registry, installing the built-ins on first use.
pub fn global() -> Arc<ComponentRegistry> {
    if let Some(registry) = GLOBAL
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .as_ref()
    {
        return Arc::clone(registry);
    }
    init_global(ComponentRegistry::with_builtins())
}

/// Drop the process-wide registry, including its load cache.
pub fn reset_global() {
    *GLOBAL.write().unwrap_or_else(PoisonError::into_inner) = None;
}
