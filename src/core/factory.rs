//! Application Factory
//!
//! Builds the [`AppState`] from configuration: creates the store, then
//! prepares the collection. Preparation failures are logged, not fatal, so
//! the liveness endpoint answers even while the database is unreachable.

use crate::core::app_state::AppState;
use crate::core::config::Config;
use crate::core::error::Result;
use crate::storage::{create_store, SharedStore};

/// Create AppState based on configuration
pub async fn create_app_state(config: Config) -> Result<AppState> {
    tracing::info!("Creating AppState with storage type: {:?}", config.storage.storage_type);

    let store = create_store(&config.storage).await?;
    prepare_store(&store).await;

    Ok(AppState::new(store, config))
}

/// Ping the deployment and make sure the title index exists
pub async fn prepare_store(store: &SharedStore) {
    match store.ping().await {
        Ok(()) => tracing::info!("Pinged {} store, connection is healthy", store.backend()),
        Err(e) => tracing::warn!("Store ping failed, continuing without it: {}", e),
    }

    match store.ensure_indexes().await {
        Ok(()) => tracing::debug!("Title index ensured"),
        Err(e) => tracing::warn!("Could not ensure title index: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::StorageType;

    #[tokio::test]
    async fn test_create_memory_app_state() {
        let mut config = Config::default();
        config.storage.storage_type = StorageType::Memory;
        config.storage.category_limit = 7;

        let state = create_app_state(config).await.unwrap();
        assert_eq!(state.store.backend(), "memory");
        assert_eq!(state.category_limit(), 7);
        assert!(state.upsert_on_update());
    }

    #[tokio::test]
    async fn test_unreachable_mongo_still_starts() {
        let mut config = Config::default();
        config.storage.storage_type = StorageType::Mongo;
        config.storage.srv = true;
        config.storage.host = "cluster0.doesnotexist.invalid".to_string();

        let state = create_app_state(config).await.unwrap();
        assert_eq!(state.store.backend(), "mongo");
        assert!(state.store.ping().await.is_err());
    }
}
