//! # Todo Store
//!
//! A personal to-do list kept in memory and mirrored to an asynchronous
//! key-value backing store after every change.

pub mod error;
pub mod id;
pub mod memory;
pub mod storage;
pub mod store;
pub mod structs;

// Re-exports
pub use error::{PersistenceError, StorageError, TodoError};
pub use id::{IdGenerator, UuidGenerator};
pub use memory::MemoryKeyValueStore;
pub use storage::{FileKeyValueStore, KeyValueStore};
pub use store::{TodoStore, DEFAULT_STORAGE_KEY};
pub use structs::{TodoItem, TodoList};
