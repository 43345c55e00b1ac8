pub mod base;
pub mod file_store;
pub mod memory_store;

// Re-export the primary storage items so code outside can do
// "use crate::storage::{KeyValueStore, create_storage};"
pub use base::{create_storage, keys, KeyValueStore};
pub use file_store::FileStore;
pub use memory_store::MemoryStore;
