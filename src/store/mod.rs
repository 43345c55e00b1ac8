pub mod app_store;

// Re-export the primary store items so code outside can do
// "use crate::store::{AppStore, Lifecycle};"
pub use app_store::{AppStore, Lifecycle};
