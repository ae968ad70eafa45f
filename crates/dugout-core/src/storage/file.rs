use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::Result;
use tracing::debug;

use super::{validate_key, Storage, StorageError};

const FILE_EXTENSION: &str = "json";

/// File-backed medium: `<data_dir>/<key>.json`.
pub struct FileStorage {
    data_dir: PathBuf,
}

impl FileStorage {
    pub fn new(data_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&data_dir)?;
        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &PathBuf {
        &self.data_dir
    }

    fn key_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.data_dir.join(format!("{}.{}", key, FILE_EXTENSION)))
    }

    fn io_error(key: &str, source: std::io::Error) -> StorageError {
        StorageError::Io {
            key: key.to_string(),
            source,
        }
    }
}

impl Storage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.key_path(key)?;
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::io_error(key, e)),
        }
    }

    fn write(&self, key: &str, contents: &str) -> Result<(), StorageError> {
        let path = self.key_path(key)?;
        // Write to a sibling temp file and rename so a crash never leaves half a blob
        let tmp = path.with_extension(format!("{}.tmp", FILE_EXTENSION));
        std::fs::write(&tmp, contents).map_err(|e| Self::io_error(key, e))?;
        std::fs::rename(&tmp, &path).map_err(|e| Self::io_error(key, e))?;
        debug!(key = %key, bytes = contents.len(), "Wrote storage file");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.key_path(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io_error(key, e)),
        }
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let entries =
            std::fs::read_dir(&self.data_dir).map_err(|e| Self::io_error("<data dir>", e))?;

        let mut keys: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().and_then(|e| e.to_str()) == Some(FILE_EXTENSION))
            .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(String::from))
            .collect();
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_absent_key() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        assert_eq!(storage.read("bucksport.teams").unwrap(), None);
    }

    #[test]
    fn test_write_then_read_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        storage.write("bucksport.teams", "[]").unwrap();
        drop(storage);

        let reopened = FileStorage::new(dir.path().to_path_buf()).unwrap();
        assert_eq!(
            reopened.read("bucksport.teams").unwrap().as_deref(),
            Some("[]")
        );
    }

    #[test]
    fn test_remove_and_keys() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path().join("nested")).unwrap();
        storage.write("ns.b", "1").unwrap();
        storage.write("ns.a", "2").unwrap();
        assert_eq!(storage.keys().unwrap(), vec!["ns.a", "ns.b"]);

        storage.remove("ns.a").unwrap();
        storage.remove("ns.a").unwrap(); // absent is fine
        assert_eq!(storage.keys().unwrap(), vec!["ns.b"]);
    }

    #[test]
    fn test_rejects_path_traversal() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        assert!(matches!(
            storage.write("../escape", "{}"),
            Err(StorageError::InvalidKey(_))
        ));
    }
}
