//! Process-wide configuration slot.
//!
//! The configuration is loaded once and then shared read-only. The slot can be
//! cleared so tests start from a known state.

use std::sync::{Arc, PoisonError, RwLock};

use crate::Config;

static GLOBAL: RwLock<Option<Arc<Config>>> = RwLock::new(None);

/// Install the process-wide configuration.
///
/// The first installed configuration stays in place until [`reset_global`];
/// later calls return the existing instance and drop `config`.
pub fn init_global(config: Config) -> Arc<Config> {
    let mut slot = GLOBAL.write().unwrap_or_else(PoisonError::into_inner);
    if let Some(existing) = slot.as_ref() {
        tracing::debug!("Global configuration already initialized");
        return Arc::clone(existing);
    }
    let config = Arc::new(config);
    *slot = Some(Arc::clone(&config));
    config
}

/// Get the process-wide configuration, if initialized.
pub fn global() -> Option<Arc<Config>> {
    GLOBAL
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .as_ref()
        .map(Arc::clone)
}

/// Clear the process-wide configuration.
pub fn reset_global() {
    *GLOBAL.write().unwrap_or_else(PoisonError::into_inner) = None;
}
