use std::collections::BTreeMap;
use std::sync::RwLock;

use super::{validate_key, Storage, StorageError};

/// In-process medium. Contents vanish with the value.
#[derive(Default)]
pub struct MemoryStorage {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        validate_key(key)?;
        let entries = self.entries.read().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, contents: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        let mut entries = self.entries.write().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_string(), contents.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        let mut entries = self.entries.write().map_err(|_| StorageError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let entries = self.entries.read().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.keys().cloned().collect())
    }
}
