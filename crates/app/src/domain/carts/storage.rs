//! Persisted key/value storage for the cart identifier.

use std::{
    collections::BTreeMap,
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;
use tokio::{fs, sync::Mutex};
use tracing::debug;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("storage file is malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("storage is disabled")]
    Disabled,
}

/// String key/value store scoped to one storefront.
#[automock]
#[async_trait]
pub trait CartIdStorage: Send + Sync {
    /// Read a value.
    async fn get(&self, key: &'static str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    async fn set(&self, key: &'static str, value: String) -> Result<(), StorageError>;

    /// Delete a value. Deleting an absent key is not an error.
    async fn remove(&self, key: &'static str) -> Result<(), StorageError>;
}

/// Storage backed by a JSON object file. Survives restarts.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let contents = match fs::read(&self.path).await {
            Ok(contents) => contents,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(error) => return Err(error.into()),
        };

        if contents.iter().all(u8::is_ascii_whitespace) {
            return Ok(BTreeMap::new());
        }

        Ok(serde_json::from_slice(&contents)?)
    }

    async fn write(&self, values: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        // Write then rename so a crash never leaves a half-written file.
        let staging = self.path.with_extension("tmp");

        fs::write(&staging, serde_json::to_vec_pretty(values)?).await?;
        fs::rename(&staging, &self.path).await?;

        debug!(path = %self.path.display(), "storage file written");

        Ok(())
    }
}

#[async_trait]
impl CartIdStorage for FileStorage {
    async fn get(&self, key: &'static str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().await;

        Ok(self.read().await?.remove(key))
    }

    async fn set(&self, key: &'static str, value: String) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;

        let mut values = self.read().await?;

        values.insert(key.to_string(), value);

        self.write(&values).await
    }

    async fn remove(&self, key: &'static str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;

        let mut values = self.read().await?;

        if values.remove(key).is_none() {
            return Ok(());
        }

        self.write(&values).await
    }
}

/// Process-lifetime storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CartIdStorage for MemoryStorage {
    async fn get(&self, key: &'static str) -> Result<Option<String>, StorageError> {
        Ok(self.values.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &'static str, value: String) -> Result<(), StorageError> {
        self.values.lock().await.insert(key.to_string(), value);

        Ok(())
    }

    async fn remove(&self, key: &'static str) -> Result<(), StorageError> {
        self.values.lock().await.remove(key);

        Ok(())
    }
}

/// Storage that refuses every access, as in a browser with storage disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledStorage;

#[async_trait]
impl CartIdStorage for DisabledStorage {
    async fn get(&self, _key: &'static str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Disabled)
    }

    async fn set(&self, _key: &'static str, _value: String) -> Result<(), StorageError> {
        Err(StorageError::Disabled)
    }

    async fn remove(&self, _key: &'static str) -> Result<(), StorageError> {
        Err(StorageError::Disabled)
    }
}
