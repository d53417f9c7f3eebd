//! Application state for the web layer.

use std::sync::Arc;

use crate::cache::CachedServiceStore;
use crate::store::SharedBackend;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Cached service store
    pub store: Arc<CachedServiceStore<SharedBackend>>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(store: CachedServiceStore<SharedBackend>) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}
