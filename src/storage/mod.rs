pub mod base;
pub mod file_storage;
pub mod memory_storage;

// Re-export the primary storage items so code outside can do
// "use crate::storage::{KeyValueStorage, create_storage};"
pub use base::{create_storage, KeyValueStorage, StorageError, TOKEN_KEY};
pub use file_storage::FileStorage;
pub use memory_storage::MemoryStorage;
