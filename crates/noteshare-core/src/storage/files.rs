//! Uploaded file storage
//!
//! Persists upload payloads under the configured upload directory and
//! hands back stable references (path, original name, byte size). The
//! catalog never touches payload bytes except through this store.
//!
//! Files are written atomically (temp file, then rename) so a crashed
//! upload never leaves a partially-written payload behind.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::debug;

use crate::models::StoredFile;
use crate::storage::error::{StoreError, StoreResult};

/// Filesystem store for uploaded note payloads
pub struct FileStore {
    upload_dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at the given upload directory
    ///
    /// The directory is created lazily on first write.
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
        }
    }

    /// The directory payloads are stored under
    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// Persist uploaded bytes under a unique name
    ///
    /// The stored name is the upload name prefixed with the current
    /// timestamp; the reference keeps the original name for display.
    pub fn store(&self, file_name: &str, bytes: &[u8]) -> StoreResult<StoredFile> {
        fs::create_dir_all(&self.upload_dir).map_err(|source| StoreError::FileWrite {
            path: self.upload_dir.clone(),
            source,
        })?;

        let path = self.unique_path(file_name);
        atomic_write(&path, bytes)?;

        debug!(path = %path.display(), size = bytes.len(), "stored upload");

        Ok(StoredFile {
            path,
            file_name: file_name.to_string(),
            file_size: bytes.len() as i64,
        })
    }

    /// Read a stored payload back for streaming to a caller
    pub fn read(&self, stored: &StoredFile) -> StoreResult<Vec<u8>> {
        fs::read(&stored.path).map_err(|source| StoreError::FileRead {
            path: stored.path.clone(),
            source,
        })
    }

    /// Delete the underlying payload
    ///
    /// Deleting a reference whose file is already gone is not an error.
    pub fn remove(&self, stored: &StoredFile) -> StoreResult<()> {
        if !stored.path.exists() {
            return Ok(());
        }

        fs::remove_file(&stored.path).map_err(|source| StoreError::FileDelete {
            path: stored.path.clone(),
            source,
        })
    }

    /// Pick a path that does not collide with an existing upload
    fn unique_path(&self, file_name: &str) -> PathBuf {
        let base = format!("{}_{}", Utc::now().timestamp(), file_name);
        let mut candidate = self.upload_dir.join(&base);
        let mut counter = 1;
        while candidate.exists() {
            candidate = self.upload_dir.join(format!("{}_{}", counter, base));
            counter += 1;
        }
        candidate
    }
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
fn atomic_write(path: &Path, data: &[u8]) -> StoreResult<()> {
    let temp_path = path.with_extension("tmp");

    let write = |temp_path: &Path| -> std::io::Result<()> {
        let mut file = File::create(temp_path)?;
        file.write_all(data)?;
        file.sync_all()?;
        Ok(())
    };

    write(&temp_path).map_err(|source| StoreError::FileWrite {
        path: temp_path.clone(),
        source,
    })?;

    fs::rename(&temp_path, path).map_err(|source| StoreError::FileWrite {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store() -> (FileStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path().join("uploads"));
        (store, temp_dir)
    }

    #[test]
    fn test_store_and_read() {
        let (store, _dir) = test_store();

        let stored = store.store("lecture.pdf", b"lecture notes").unwrap();
        assert_eq!(stored.file_name, "lecture.pdf");
        assert_eq!(stored.file_size, 13);
        assert!(stored.path.exists());

        let bytes = store.read(&stored).unwrap();
        assert_eq!(bytes, b"lecture notes");
    }

    #[test]
    fn test_store_creates_upload_dir() {
        let (store, _dir) = test_store();
        assert!(!store.upload_dir().exists());

        store.store("a.txt", b"a").unwrap();
        assert!(store.upload_dir().exists());
    }

    #[test]
    fn test_stored_name_keeps_original_for_display() {
        let (store, _dir) = test_store();

        let stored = store.store("summary.md", b"# Summary").unwrap();
        let on_disk = stored.path.file_name().unwrap().to_string_lossy();
        assert!(on_disk.ends_with("summary.md"));
        assert_ne!(on_disk, "summary.md");
    }

    #[test]
    fn test_same_name_does_not_collide() {
        let (store, _dir) = test_store();

        let first = store.store("notes.txt", b"one").unwrap();
        let second = store.store("notes.txt", b"two").unwrap();

        assert_ne!(first.path, second.path);
        assert_eq!(store.read(&first).unwrap(), b"one");
        assert_eq!(store.read(&second).unwrap(), b"two");
    }

    #[test]
    fn test_remove() {
        let (store, _dir) = test_store();

        let stored = store.store("temp.txt", b"bytes").unwrap();
        assert!(stored.path.exists());

        store.remove(&stored).unwrap();
        assert!(!stored.path.exists());

        // Removing again is fine
        store.remove(&stored).unwrap();
    }

    #[test]
    fn test_read_missing_file_fails() {
        let (store, _dir) = test_store();

        let stored = StoredFile {
            path: store.upload_dir().join("gone.pdf"),
            file_name: "gone.pdf".to_string(),
            file_size: 0,
        };

        let err = store.read(&stored).unwrap_err();
        assert!(matches!(err, StoreError::FileRead { .. }));
    }
}
