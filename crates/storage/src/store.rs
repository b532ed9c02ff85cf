use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Errors surfaced by storage adapters.
///
/// Callers in the services layer treat every one of these as "nothing
/// stored" on read and swallow them on write; they exist so adapters can
/// still say what went wrong in logs.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// String-keyed durable store for small JSON values.
///
/// No transactions and no cross-key ordering guarantees; each key is
/// independent.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Fetch the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read or the stored
    /// bytes are not valid JSON.
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    async fn set(&self, key: &str, value: &Value) -> Result<(), StorageError>;

    /// Remove the value stored under `key`. Removing an absent key is fine.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the delete fails.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Simple in-memory store implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    values: Arc<Mutex<HashMap<String, Value>>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned (test-only helper).
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.lock().expect("store lock poisoned").len()
    }

    /// # Panics
    ///
    /// Panics if the internal lock is poisoned (test-only helper).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ProgressStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &Value) -> Result<(), StorageError> {
        let mut guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_owned(), value.clone());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(key);
        Ok(())
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
