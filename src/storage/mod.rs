pub mod base;
pub mod file_storage;
pub mod memory_storage;
pub mod session;

// Re-export the primary storage items so code outside can do
// "use crate::storage::{KeyValueStorage, SessionAccessor};"
pub use base::{create_storage, KeyValueStorage, StorageError};
pub use session::SessionAccessor;
