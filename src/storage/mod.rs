//! Storage implementations for different backends

pub mod in_memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use in_memory::InMemoryStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

use crate::config::{ServerConfig, StorageConfig};
use crate::core::Store;
use anyhow::Result;
use std::sync::Arc;

/// Open the backend selected by the configuration
pub async fn connect(config: &ServerConfig) -> Result<Arc<dyn Store>> {
    match &config.storage {
        StorageConfig::InMemory => {
            tracing::info!("Using in-memory storage");
            Ok(Arc::new(InMemoryStore::with_inventory_policy(config.inventory_policy)))
        }
        #[cfg(feature = "sqlite")]
        StorageConfig::Sqlite { path } => {
            let store = SqliteStore::connect(path, config.inventory_policy).await?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "sqlite"))]
        StorageConfig::Sqlite { path } => Err(anyhow::anyhow!(
            "SQLite storage requested ({}) but the `sqlite` feature is not enabled",
            path
        )),
    }
}
