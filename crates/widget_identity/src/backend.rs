use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde_json::{Map, Value};

use crate::error::IdentityStoreError;
use crate::paths::durable_store_path;

/// String key/value storage behind the identity store.
///
/// Implementations decide how long values live: [`FileStore`] survives
/// restarts, [`MemoryStore`] lives as long as the value itself.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, IdentityStoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), IdentityStoreError>;
    fn remove(&self, key: &str) -> Result<(), IdentityStoreError>;
}

/// Tab-scoped storage: values vanish with the owning process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, IdentityStoreError> {
        Ok(lock_unpoisoned(&self.values).get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), IdentityStoreError> {
        lock_unpoisoned(&self.values).insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), IdentityStoreError> {
        lock_unpoisoned(&self.values).remove(key);
        Ok(())
    }
}

/// Durable storage: a single JSON object of string values on disk.
///
/// Every write rewrites the whole file through a sibling temp file and a
/// rename, so readers never observe a partially written object.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    guard: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    /// Store at the conventional location below `root`.
    pub fn under_root(root: &Path) -> Self {
        Self::new(durable_store_path(root))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, IdentityStoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Ok(BTreeMap::new());
            }
            Err(source) => {
                return Err(IdentityStoreError::io(
                    "reading identity store",
                    &self.path,
                    source,
                ));
            }
        };

        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        let parsed: Value = serde_json::from_str(&raw)
            .map_err(|source| IdentityStoreError::parse(&self.path, source))?;
        let Value::Object(object) = parsed else {
            return Err(IdentityStoreError::InvalidShape {
                path: self.path.clone(),
            });
        };

        object
            .into_iter()
            .map(|(key, value)| match value {
                Value::String(value) => Ok((key, value)),
                _ => Err(IdentityStoreError::InvalidShape {
                    path: self.path.clone(),
                }),
            })
            .collect()
    }

    fn write_all(&self, values: &BTreeMap<String, String>) -> Result<(), IdentityStoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| {
                IdentityStoreError::io("creating identity store directory", parent, source)
            })?;
        }

        let object: Map<String, Value> = values
            .iter()
            .map(|(key, value)| (key.clone(), Value::String(value.clone())))
            .collect();
        let serialized = serde_json::to_string_pretty(&Value::Object(object))
            .map_err(|source| IdentityStoreError::serialize(&self.path, source))?;

        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, serialized).map_err(|source| {
            IdentityStoreError::io("writing identity store", &temp_path, source)
        })?;
        fs::rename(&temp_path, &self.path).map_err(|source| {
            IdentityStoreError::io("replacing identity store", &self.path, source)
        })
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, IdentityStoreError> {
        let _guard = lock_unpoisoned(&self.guard);
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), IdentityStoreError> {
        let _guard = lock_unpoisoned(&self.guard);
        let mut values = self.read_all()?;
        values.insert(key.to_string(), value.to_string());
        self.write_all(&values)
    }

    fn remove(&self, key: &str) -> Result<(), IdentityStoreError> {
        let _guard = lock_unpoisoned(&self.guard);
        let mut values = self.read_all()?;
        if values.remove(key).is_some() {
            self.write_all(&values)?;
        }
        Ok(())
    }
}

pub(crate) fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
