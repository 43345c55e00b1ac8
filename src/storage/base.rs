use std::sync::Arc;

use tracing::info;

use super::{file_store::FileStore, memory_store::MemoryStore};
use crate::config::StorageConfig;
use crate::error::StorageError;

/// Well-known keys shared by the auth layer, the app store and the router guard.
pub mod keys {
    pub const ACCESS_TOKEN: &str = "token";
    pub const REFRESH_TOKEN: &str = "refreshToken";
    pub const THEME: &str = "theme";
    pub const ITEM_ORDER: &str = "itemOrder";
    pub const REDIRECT_PATH: &str = "redirectPath";
}

/// The KeyValueStore trait abstracts the device-local persistent storage.
///
/// Values are plain text at rest. A missing key is `None`, never an error.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    /// Removing a key that does not exist is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
    fn name(&self) -> &str;
}

/// Creates a concrete storage backend based on the StorageConfig.
pub fn create_storage(config: &StorageConfig) -> Arc<dyn KeyValueStore> {
    match config {
        StorageConfig::File(file_config) => {
            info!("Using file storage at '{}'", file_config.path.display());
            Arc::new(FileStore::open(&file_config.path))
        }
        StorageConfig::Memory => {
            info!("Using in-memory storage; nothing will survive a restart.");
            Arc::new(MemoryStore::new())
        }
    }
}
