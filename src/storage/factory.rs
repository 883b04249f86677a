//! Storage factory for creating store implementations based on configuration

use std::sync::Arc;

use crate::core::config::{StorageConfig, StorageType};
use crate::core::error::Result;
use crate::storage::{MemoryToyStore, MongoToyStore, SharedStore};

/// Create the configured store
pub async fn create_store(config: &StorageConfig) -> Result<SharedStore> {
    match config.storage_type {
        StorageType::Memory => {
            tracing::warn!("Using in-memory storage; toys are lost on shutdown");
            Ok(Arc::new(MemoryToyStore::new()))
        }
        StorageType::Mongo => {
            let store = MongoToyStore::connect(config).await?;
            Ok(Arc::new(store))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_storage_creation() {
        let config = StorageConfig {
            storage_type: StorageType::Memory,
            ..Default::default()
        };

        let store = create_store(&config).await.unwrap();
        assert_eq!(store.backend(), "memory");
        assert!(store.ping().await.is_ok());
    }

    #[tokio::test]
    async fn test_mongo_storage_rejects_bad_uri() {
        let config = StorageConfig {
            storage_type: StorageType::Mongo,
            uri: Some("postgres://not-mongo".to_string()),
            ..Default::default()
        };

        assert!(create_store(&config).await.is_err());
    }
}
