//! In-memory storage implementation.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral use.
#[derive(Default)]
pub struct MemoryStorage {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a value is stored under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.values
            .read()
            .map(|values| values.contains_key(key))
            .unwrap_or(false)
    }
}

impl Storage for MemoryStorage {
    fn save(&self, key: &str, value: &str) -> BoxFuture<'_, StorageResult<()>> {
        let key = key.to_string();
        let value = value.to_string();
        Box::pin(async move {
            let mut values = self.values.write().map_err(|e| {
                StorageError::Other(format!("Lock error: {}", e))
            })?;
            values.insert(key, value);
            Ok(())
        })
    }

    fn load(&self, key: &str) -> BoxFuture<'_, StorageResult<String>> {
        let key = key.to_string();
        Box::pin(async move {
            let values = self.values.read().map_err(|e| {
                StorageError::Other(format!("Lock error: {}", e))
            })?;
            values
                .get(&key)
                .cloned()
                .ok_or_else(|| StorageError::NotFound(key))
        })
    }

    fn delete(&self, key: &str) -> BoxFuture<'_, StorageResult<()>> {
        let key = key.to_string();
        Box::pin(async move {
            let mut values = self.values.write().map_err(|e| {
                StorageError::Other(format!("Lock error: {}", e))
            })?;
            values.remove(&key);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::block_on;

    #[test]
    fn test_save_and_load() {
        let storage = MemoryStorage::new();

        block_on(storage.save("regions", "[]")).unwrap();
        let loaded = block_on(storage.load("regions")).unwrap();

        assert_eq!(loaded, "[]");
    }

    #[test]
    fn test_save_overwrites() {
        let storage = MemoryStorage::new();

        block_on(storage.save("regions", "[1]")).unwrap();
        block_on(storage.save("regions", "[2]")).unwrap();

        assert_eq!(block_on(storage.load("regions")).unwrap(), "[2]");
    }

    #[test]
    fn test_not_found() {
        let storage = MemoryStorage::new();
        let result = block_on(storage.load("nonexistent"));

        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_delete() {
        let storage = MemoryStorage::new();

        block_on(storage.save("regions", "[]")).unwrap();
        assert!(storage.contains("regions"));
        block_on(storage.delete("regions")).unwrap();
        assert!(!storage.contains("regions"));

        // Deleting again is fine
        block_on(storage.delete("regions")).unwrap();
    }
}
