//! Application State Management
//!
//! The state handed to every request handler: the store handle, created once
//! at start-up, and the configuration it was built from.

use std::sync::Arc;
use std::time::Instant;

use crate::core::config::Config;
use crate::storage::SharedStore;

/// Central application state holding all services and components
#[derive(Clone)]
pub struct AppState {
    /// Collection gateway shared by all requests
    pub store: SharedStore,

    /// Application configuration
    pub config: Arc<Config>,

    /// When the state was built, reported by the health endpoint
    pub started_at: Instant,
}

impl AppState {
    /// Create a new AppState around an already constructed store
    pub fn new(store: SharedStore, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
            started_at: Instant::now(),
        }
    }

    /// Upsert behaviour for updates that do not specify one
    pub fn upsert_on_update(&self) -> bool {
        self.config.storage.upsert_on_update
    }

    /// Maximum size of a category listing
    pub fn category_limit(&self) -> usize {
        self.config.storage.category_limit
    }
}
