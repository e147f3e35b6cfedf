use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use super::{KeyValueStorage, StorageError};

/// Persists all keys as one JSON object in a file, so a session survives
/// restarts the way browser storage survives page reloads.
///
/// Every write rewrites the whole document through a temporary file and a
/// rename. Writers inside one process are serialized by `write_lock`.
pub struct FileStorage {
    path: PathBuf,
    write_lock: Mutex<()>,
}

type Document = BTreeMap<String, String>;

impl FileStorage {
    pub fn new(path: &Path) -> Self {
        FileStorage {
            path: path.to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_document(&self) -> Result<Document, StorageError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Document::new()),
            Err(e) => return Err(e.into()),
        };
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(Document::new());
        }
        Ok(serde_json::from_slice(&raw)?)
    }

    async fn write_document(&self, document: &Document) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let serialized = serde_json::to_vec_pretty(document)?;
        let tmp_path = self.path.with_extension("tmp");
        tokio::fs::write(&tmp_path, serialized).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;
        debug!("Wrote {} key(s) to {}", document.len(), self.path.display());
        Ok(())
    }
}

#[async_trait]
impl KeyValueStorage for FileStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_document().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut document = self.read_document().await?;
        document.insert(key.to_string(), value.to_string());
        self.write_document(&document).await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut document = self.read_document().await?;
        if document.remove(key).is_none() {
            return Ok(());
        }
        self.write_document(&document).await
    }

    fn describe(&self) -> String {
        format!("file storage at '{}'", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_missing_file_reads_as_empty() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(&dir.path().join("nothing.json"));
        assert_eq!(storage.get("auth_token").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_values_survive_a_new_instance() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        let storage = FileStorage::new(&path);
        storage.set("auth_token", "T1").await.unwrap();
        storage.set("theme", "dark").await.unwrap();

        let reopened = FileStorage::new(&path);
        assert_eq!(reopened.get("auth_token").await.unwrap().as_deref(), Some("T1"));
        assert_eq!(reopened.get("theme").await.unwrap().as_deref(), Some("dark"));
    }

    #[tokio::test]
    async fn test_remove_keeps_other_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.json");
        let storage = FileStorage::new(&path);
        storage.set("auth_token", "T1").await.unwrap();
        storage.set("theme", "dark").await.unwrap();

        storage.remove("auth_token").await.unwrap();

        assert_eq!(storage.get("auth_token").await.unwrap(), None);
        assert_eq!(storage.get("theme").await.unwrap().as_deref(), Some("dark"));
        assert!(!path.with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn test_corrupt_document_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "{not json").unwrap();

        let storage = FileStorage::new(&path);
        assert!(matches!(
            storage.get("auth_token").await,
            Err(StorageError::Json(_))
        ));
    }
}
