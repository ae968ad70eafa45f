//! Storage media for the local entity store.
//!
//! A medium holds one JSON text blob per key and knows nothing about what
//! the blobs contain. Two media are provided:
//!
//! - `FileStorage`: one `<key>.json` file per key in a data directory
//! - `MemoryStorage`: an in-process map, for tests and throwaway sessions

pub mod file;
pub mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error for key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage lock poisoned")]
    Poisoned,
}

/// A synchronous key/value medium holding JSON text.
pub trait Storage: Send + Sync {
    /// Read the blob stored under `key`, or `None` when the key is absent.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn write(&self, key: &str, contents: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// All keys currently present, sorted.
    fn keys(&self) -> Result<Vec<String>, StorageError>;
}

/// Keys become file names, so keep them to a conservative character set.
pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_key() {
        assert!(validate_key("bucksport.teams").is_ok());
        assert!(validate_key("bucksport.eventUsage").is_ok());
        assert!(validate_key("a-b_c").is_ok());

        assert!(validate_key("").is_err());
        assert!(validate_key("../etc/passwd").is_err());
        assert!(validate_key(".hidden").is_err());
        assert!(validate_key("with space").is_err());
        assert!(validate_key("slash/key").is_err());
    }
}
