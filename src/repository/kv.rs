//! Key-Value Backends
//!
//! In-memory (tests, quota simulation), file-backed, and browser
//! `localStorage` on wasm32.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::domain::{DomainError, DomainResult};

use super::traits::KeyValueStore;

/// In-memory store with an optional byte quota over all values
#[derive(Debug, Default)]
pub struct MemoryKv {
    entries: Mutex<HashMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject writes that would push the total stored size past `bytes`
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            quota_bytes: Some(bytes),
        }
    }

    fn lock(&self) -> DomainResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| DomainError::Internal("memory store lock poisoned".to_string()))
    }
}

impl KeyValueStore for MemoryKv {
    fn get(&self, key: &str) -> DomainResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> DomainResult<()> {
        let mut entries = self.lock()?;
        if let Some(quota) = self.quota_bytes {
            let others: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            if others + key.len() + value.len() > quota {
                return Err(DomainError::Storage(format!("quota of {} bytes exceeded", quota)));
            }
        }
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> DomainResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileKv {
    dir: PathBuf,
}

impl FileKv {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", file))
    }
}

impl KeyValueStore for FileKv {
    fn get(&self, key: &str) -> DomainResult<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DomainError::Storage(e.to_string())),
        }
    }

    fn set(&self, key: &str, value: &str) -> DomainResult<()> {
        fs::create_dir_all(&self.dir).map_err(|e| DomainError::Storage(e.to_string()))?;
        let path = self.path_for(key);
        // write-then-rename
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(|e| DomainError::Storage(e.to_string()))?;
        fs::rename(&tmp, &path).map_err(|e| DomainError::Storage(e.to_string()))
    }

    fn remove(&self, key: &str) -> DomainResult<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DomainError::Storage(e.to_string())),
        }
    }
}

/// Browser `window.localStorage`
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct WebStorageKv;

#[cfg(target_arch = "wasm32")]
impl WebStorageKv {
    fn storage() -> DomainResult<web_sys::Storage> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .ok_or_else(|| DomainError::Storage("localStorage unavailable".to_string()))
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for WebStorageKv {
    fn get(&self, key: &str) -> DomainResult<Option<String>> {
        Self::storage()?
            .get_item(key)
            .map_err(|e| DomainError::Storage(format!("{:?}", e)))
    }

    fn set(&self, key: &str, value: &str) -> DomainResult<()> {
        Self::storage()?
            .set_item(key, value)
            .map_err(|e| DomainError::Storage(format!("{:?}", e)))
    }

    fn remove(&self, key: &str) -> DomainResult<()> {
        Self::storage()?
            .remove_item(key)
            .map_err(|e| DomainError::Storage(format!("{:?}", e)))
    }
}
