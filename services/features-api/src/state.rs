//! Application state shared across handlers.

use std::sync::Arc;

use storage::FeatureStore;

use crate::auth::AuthConfig;
use crate::config::ServiceConfig;
use crate::registry::CollectionRegistry;

/// Shared, read-only application state.
pub struct AppState {
    pub registry: CollectionRegistry,

    /// Injected store handle; its pool lives for the whole process.
    pub store: Arc<dyn FeatureStore>,

    pub auth: AuthConfig,
    pub service: ServiceConfig,
}

impl AppState {
    pub fn new(
        registry: CollectionRegistry,
        store: Arc<dyn FeatureStore>,
        auth: AuthConfig,
        service: ServiceConfig,
    ) -> Self {
        Self {
            registry,
            store,
            auth,
            service,
        }
    }
}
