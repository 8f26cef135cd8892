//! Browser `localStorage` implementation for WebAssembly.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use wasm_bindgen::JsValue;

const KEY_PREFIX: &str = "lectern:";

/// `window.localStorage` backed storage.
///
/// Note: This is intentionally not Send/Sync since WASM is single-threaded
/// and the storage handle is a JS object.
pub struct LocalStorage {
    storage: web_sys::Storage,
}

impl LocalStorage {
    /// Acquire the window's local storage.
    pub fn new() -> StorageResult<Self> {
        let window = web_sys::window()
            .ok_or_else(|| StorageError::Other("No window object".to_string()))?;
        let storage = window
            .local_storage()
            .map_err(|e| StorageError::Other(format!("localStorage error: {}", describe(&e))))?
            .ok_or_else(|| StorageError::Other("localStorage not available".to_string()))?;
        Ok(Self { storage })
    }

    fn prefixed(key: &str) -> String {
        format!("{}{}", KEY_PREFIX, key)
    }
}

fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

impl Storage for LocalStorage {
    fn save(&self, key: &str, value: &str) -> BoxFuture<'_, StorageResult<()>> {
        // Quota errors surface here
        let result = self
            .storage
            .set_item(&Self::prefixed(key), value)
            .map_err(|e| StorageError::Io(format!("setItem failed: {}", describe(&e))));
        Box::pin(async move { result })
    }

    fn load(&self, key: &str) -> BoxFuture<'_, StorageResult<String>> {
        let key_owned = key.to_string();
        let result = self
            .storage
            .get_item(&Self::prefixed(key))
            .map_err(|e| StorageError::Io(format!("getItem failed: {}", describe(&e))))
            .and_then(|value| value.ok_or(StorageError::NotFound(key_owned)));
        Box::pin(async move { result })
    }

    fn delete(&self, key: &str) -> BoxFuture<'_, StorageResult<()>> {
        let result = self
            .storage
            .remove_item(&Self::prefixed(key))
            .map_err(|e| StorageError::Io(format!("removeItem failed: {}", describe(&e))));
        Box::pin(async move { result })
    }
}
