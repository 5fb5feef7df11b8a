use crate::domain::ports::KeyValueStorage;
use crate::utils::error::{QuoteError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Filesystem-backed key-value storage, one file per key under a base
/// directory. Plays the role the browser's localStorage plays for the web
/// flows: durable, string-valued, no TTL.
///
/// Writes go to a temp file first and are renamed into place, so a reader
/// sees either the old value or the new one, never a torn write. Concurrent
/// writers are not coordinated; the last rename wins.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new<P: Into<PathBuf>>(base_path: P) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn key_path(&self, key: &str) -> Result<PathBuf> {
        // Keys become filenames; anything that could escape the directory is rejected.
        if key.is_empty()
            || !key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(QuoteError::ValidationError {
                field: "storage_key".to_string(),
                message: format!("Invalid storage key '{}'", key),
            });
        }
        Ok(self.base_path.join(format!("{}.json", key)))
    }
}

impl KeyValueStorage for LocalStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp_path = tmp_path_for(&path);
        fs::write(&tmp_path, value)?;
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let path = self.key_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}
