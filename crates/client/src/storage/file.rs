//! JSON-file key-value store.
//!
//! The whole store is one JSON object of string values. Every read goes to
//! disk, so writes from another process are picked up; every write replaces
//! the file through a temporary file and a rename.
//!
//! A file that does not parse as a whole is moved to `<name>.corrupt` by the
//! next write, which then starts from an empty store. Reads keep failing
//! with [`StorageError::Corrupt`] until that write happens.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, warn};
use uuid::Uuid;

use super::{KeyValueStore, StorageError, stored_size};
use crate::config::StorageConfig;

type Items = BTreeMap<String, String>;

/// Durable store backed by a single JSON file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    quota_bytes: usize,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Store at `path`. The file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, quota_bytes: usize) -> Self {
        Self {
            path: path.into(),
            quota_bytes,
            write_lock: Mutex::new(()),
        }
    }

    /// Store described by `config`, creating its parent directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created.
    pub fn open(config: &StorageConfig) -> Result<Self, StorageError> {
        if let Some(parent) = config.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        Ok(Self::new(&config.path, config.quota_bytes))
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where an unparseable backing file is moved before it is replaced.
    #[must_use]
    pub fn backup_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_else(|| "storage".into());
        name.push(".corrupt");
        self.path.with_file_name(name)
    }

    fn read_all(&self) -> Result<Items, StorageError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Items::new()),
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(Items::new());
        }
        serde_json::from_str(&raw).map_err(|e| StorageError::Corrupt(e.to_string()))
    }

    /// Current contents for a mutation. A corrupt file is moved aside first.
    fn read_for_write(&self) -> Result<Items, StorageError> {
        match self.read_all() {
            Err(StorageError::Corrupt(reason)) => {
                let backup = self.backup_path();
                fs::rename(&self.path, &backup)?;
                warn!(
                    path = %self.path.display(),
                    backup = %backup.display(),
                    %reason,
                    "Moved corrupt storage file aside"
                );
                Ok(Items::new())
            }
            other => other,
        }
    }

    fn write_all(&self, items: &Items) -> Result<(), StorageError> {
        let needed = stored_size(items);
        if needed > self.quota_bytes {
            return Err(StorageError::QuotaExceeded {
                needed,
                quota: self.quota_bytes,
            });
        }

        let body =
            serde_json::to_vec_pretty(items).map_err(|e| StorageError::Corrupt(e.to_string()))?;
        let file_name = self
            .path
            .file_name()
            .map_or_else(|| "storage".into(), |name| name.to_string_lossy());
        let tmp = self
            .path
            .with_file_name(format!(".{file_name}.{}.tmp", Uuid::new_v4()));

        fs::write(&tmp, body)?;
        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }

        debug!(path = %self.path.display(), bytes = needed, "Storage written");
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ()>, StorageError> {
        self.write_lock
            .lock()
            .map_err(|_| StorageError::Unavailable("storage lock poisoned".to_string()))
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.lock()?;
        let mut items = self.read_for_write()?;
        items.insert(key.to_owned(), value.to_owned());
        self.write_all(&items)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.lock()?;
        let mut items = self.read_for_write()?;
        if items.remove(key).is_some() {
            self.write_all(&items)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir, quota: usize) -> FileStore {
        FileStore::new(dir.path().join("storage.json"), quota)
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir, 1024);
        assert_eq!(store.get_item("token").unwrap(), None);
    }

    #[test]
    fn test_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        store_in(&dir, 1024).set_item("theme", "light").unwrap();
        let reopened = store_in(&dir, 1024);
        assert_eq!(reopened.get_item("theme").unwrap().as_deref(), Some("light"));
    }

    #[test]
    fn test_last_write_wins_across_handles() {
        let dir = tempfile::tempdir().unwrap();
        let first = store_in(&dir, 1024);
        let second = store_in(&dir, 1024);
        first.set_item("cart_u1", "[1]").unwrap();
        second.set_item("cart_u1", "[2]").unwrap();
        assert_eq!(first.get_item("cart_u1").unwrap().as_deref(), Some("[2]"));
    }

    #[test]
    fn test_quota_rejects_and_keeps_old_contents() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir, 16);
        store.set_item("a", "1").unwrap();
        let err = store.set_item("b", "x".repeat(32).as_str()).unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { quota: 16, .. }));
        assert_eq!(store.get_item("a").unwrap().as_deref(), Some("1"));
        assert_eq!(store.get_item("b").unwrap(), None);
    }

    #[test]
    fn test_corrupt_file_is_backed_up_before_replacement() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir, 1024);
        let damaged = r#"{"token": "t1", "cart_u1": "[1]""#;
        fs::write(store.path(), damaged).unwrap();
        assert!(matches!(store.get_item("k"), Err(StorageError::Corrupt(_))));

        store.set_item("k", "v").unwrap();
        assert_eq!(store.get_item("k").unwrap().as_deref(), Some("v"));
        assert_eq!(store.get_item("token").unwrap(), None);
        assert_eq!(
            store.backup_path(),
            dir.path().join("storage.json.corrupt")
        );
        assert_eq!(fs::read_to_string(store.backup_path()).unwrap(), damaged);
    }

    #[test]
    fn test_open_creates_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            path: dir.path().join("nested/dir/storage.json"),
            quota_bytes: 1024,
        };
        let store = FileStore::open(&config).unwrap();
        store.set_item("k", "v").unwrap();
        assert!(config.path.exists());
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir, 1024);
        store.set_item("k", "v").unwrap();
        store.remove_item("k").unwrap();
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, ["storage.json"]);
    }
}
