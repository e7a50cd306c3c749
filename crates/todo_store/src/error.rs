//! Todo store error types

use thiserror::Error;

/// Errors raised by a key-value backend.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),

    #[error("Backend error: {0}")]
    Backend(String),
}

/// Errors returned to callers of the todo store.
#[derive(Error, Debug)]
pub enum TodoError {
    #[error("Todo text must not be empty")]
    EmptyText,

    #[error("Could not generate a unique id (last attempt: {0})")]
    DuplicateId(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Persistence failures that are swallowed by the store and reported on its
/// error channel instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    #[error("Failed to read todo list: {0}")]
    Read(String),

    #[error("Stored todo list is malformed: {0}")]
    Malformed(String),

    #[error("Failed to write todo list: {0}")]
    Write(String),
}

pub type Result<T> = std::result::Result<T, TodoError>;
