//! Key-value persistence
//!
//! Values are JSON strings under fixed keys (see `consts`). Back-ends:
//! - `MemoryStorage`: tests and headless runs
//! - `FileStorage`: one file per key in a directory (native)
//! - `web::LocalStorage`: browser LocalStorage (wasm32)

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::StorageError;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Read and decode a JSON value
pub fn load_json<T: DeserializeOwned>(
    storage: &dyn Storage,
    key: &str,
) -> Result<Option<T>, StorageError> {
    match storage.get(key)? {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

/// Encode and write a JSON value
pub fn save_json<T: Serialize>(
    storage: &mut dyn Storage,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let json = serde_json::to_string(value)?;
    storage.set(key, &json)
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.items.remove(key);
        Ok(())
    }
}

/// Stores each key as `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        // Atomic replace via temp file
        let tmp = self.dir.join(format!("{}.json.tmp", key));
        fs::write(&tmp, value)?;
        fs::rename(&tmp, self.path(key))?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path(key)) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        value: u32,
    }

    #[test]
    fn test_memory_json_roundtrip() {
        let mut storage = MemoryStorage::new();
        assert_eq!(load_json::<Sample>(&storage, "k").unwrap(), None);
        save_json(&mut storage, "k", &Sample { value: 3 }).unwrap();
        assert_eq!(
            load_json::<Sample>(&storage, "k").unwrap(),
            Some(Sample { value: 3 })
        );
        storage.remove("k").unwrap();
        assert_eq!(storage.get("k").unwrap(), None);
    }

    #[test]
    fn test_corrupt_value_is_json_error() {
        let mut storage = MemoryStorage::new();
        storage.set("k", "{{").unwrap();
        assert!(matches!(
            load_json::<Sample>(&storage, "k"),
            Err(StorageError::Json(_))
        ));
    }

    #[test]
    fn test_file_storage() {
        let dir = std::env::temp_dir().join(format!("focus-flow-test-{}", std::process::id()));
        let mut storage = FileStorage::new(&dir).unwrap();
        assert_eq!(storage.get("missing").unwrap(), None);
        storage.set("progress", "{\"highest_unlocked\":2}").unwrap();
        assert_eq!(
            storage.get("progress").unwrap().as_deref(),
            Some("{\"highest_unlocked\":2}")
        );
        storage.remove("progress").unwrap();
        storage.remove("progress").unwrap();
        assert_eq!(storage.get("progress").unwrap(), None);
        let _ = fs::remove_dir_all(dir);
    }
}
