//! File-backed key-value store standing in for browser local storage.
//!
//! One JSON object document holds every key. Writes go through a temp file
//! and an atomic rename; a missing or unreadable document is an empty store,
//! never an error at read time.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use client_logging::{client_info, client_warn};
use tempfile::NamedTempFile;
use thiserror::Error;
use wikifix_core::SessionStore;

/// Document name inside the storage directory.
pub const STORE_FILENAME: &str = "wikifix_storage.json";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage directory missing or not writable: {0}")]
    StorageDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("serialize error: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileStore {
    /// Open the store under `dir`, creating the directory when missing.
    /// A corrupt document is logged and replaced on the next write.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        ensure_storage_dir(&dir)?;

        let path = dir.join(STORE_FILENAME);
        let values = match fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(values) => values,
                Err(err) => {
                    client_warn!("Corrupt storage document {:?}: {}", path, err);
                    BTreeMap::new()
                }
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                client_warn!("Failed to read storage document {:?}: {}", path, err);
                BTreeMap::new()
            }
        };

        client_info!("Opened storage at {:?} ({} keys)", path, values.len());
        Ok(Self { dir, values })
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(STORE_FILENAME)
    }

    fn persist(&self) -> Result<(), StorageError> {
        let content = serde_json::to_string_pretty(&self.values)?;
        let target = self.path();

        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;
        tmp.persist(&target).map_err(|err| StorageError::Io(err.error))?;
        Ok(())
    }

    fn persist_logged(&self) {
        if let Err(err) = self.persist() {
            client_warn!("Failed to persist storage: {}", err);
        }
    }
}

impl SessionStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value);
        self.persist_logged();
    }

    fn remove(&mut self, key: &str) {
        if self.values.remove(key).is_some() {
            self.persist_logged();
        }
    }
}

fn ensure_storage_dir(dir: &Path) -> Result<(), StorageError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| StorageError::StorageDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(StorageError::StorageDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| StorageError::StorageDir(e.to_string()))?;
    }
    Ok(())
}
