use crate::config::Config;
use crate::error::DocsignError;
use futures_executor::block_on;
use object_store::PutPayload;
use object_store::{
    Error as ObjectStoreError, ObjectStore, local::LocalFileSystem, memory::InMemory,
    path::Path as ObjectPath,
};
use std::str::FromStr;
use std::sync::Arc;
use strum_macros::{AsRefStr, Display, EnumString};
use tracing::debug;

pub mod jenv;

/// Key holding the JSON array of document records.
pub const DOCUMENTS_KEY: &str = "documents";
/// Key holding the logged-in demo user, absent when logged out.
pub const AUTH_USER_KEY: &str = "auth_user";

/// Minimal key-value contract the document store and demo session persist through.
///
/// Writes replace the whole value under a key. There are no transactions:
/// a crash mid-write can leave a truncated blob behind.
pub trait KeyValueStore: Send + Sync {
    fn put(&self, key: &str, contents: &[u8]) -> Result<(), DocsignError>;

    /// Returns `None` when nothing is stored under `key`.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, DocsignError>;

    /// Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), DocsignError>;

    fn exists(&self, key: &str) -> Result<bool, DocsignError> {
        Ok(self.get(key)?.is_some())
    }
}

#[derive(Debug, AsRefStr, Display, EnumString, Clone, PartialEq)]
pub enum StorageType {
    #[strum(serialize = "fs")]
    FS,
    #[strum(serialize = "memory")]
    Memory,
}

/// `object_store`-backed key-value storage.
///
/// Cloning shares the underlying backend, so a clone of an in-memory store
/// sees the same keys. That is what lets tests simulate a process restart.
#[derive(Clone)]
pub struct ObjectStorage {
    fs: Option<Arc<LocalFileSystem>>,
    memory: Option<Arc<InMemory>>,
    default_storage: StorageType,
}

impl ObjectStorage {
    fn clean_path(path: &str) -> String {
        // Remove any ./ and multiple slashes
        path.replace("./", "").replace("//", "/")
    }

    pub fn from_config(config: &Config) -> Result<Self, DocsignError> {
        let storage_type = config.docsign_default_storage().as_deref().unwrap_or("fs");
        let data_directory = config
            .docsign_data_directory()
            .as_deref()
            .unwrap_or("./docsign_data");
        Self::known_new(storage_type, data_directory)
    }

    pub fn in_memory() -> Self {
        Self {
            fs: None,
            memory: Some(Arc::new(InMemory::new())),
            default_storage: StorageType::Memory,
        }
    }

    pub fn known_new(storage_type: &str, data_directory: &str) -> Result<Self, DocsignError> {
        let default_storage = StorageType::from_str(storage_type).map_err(|_| {
            DocsignError::ConfigError(format!(
                "storage_type '{}' is not known. Use 'fs' or 'memory'.",
                storage_type
            ))
        })?;

        match default_storage {
            StorageType::FS => {
                std::fs::create_dir_all(data_directory)?;
                let absolute_path = std::path::PathBuf::from(data_directory).canonicalize()?;
                debug!("filesystem storage rooted at {}", absolute_path.display());
                let local = LocalFileSystem::new_with_prefix(absolute_path)?;
                Ok(Self {
                    fs: Some(Arc::new(local)),
                    memory: None,
                    default_storage,
                })
            }
            StorageType::Memory => Ok(Self::in_memory()),
        }
    }

    pub fn storage_type(&self) -> &StorageType {
        &self.default_storage
    }

    fn get_storage(&self) -> Result<Arc<dyn ObjectStore>, DocsignError> {
        let store: Option<Arc<dyn ObjectStore>> = match self.default_storage {
            StorageType::FS => self.fs.clone().map(|s| s as Arc<dyn ObjectStore>),
            StorageType::Memory => self.memory.clone().map(|s| s as Arc<dyn ObjectStore>),
        };
        store.ok_or_else(|| {
            DocsignError::StorageError(format!("{} storage not loaded", self.default_storage))
        })
    }
}

impl KeyValueStore for ObjectStorage {
    fn put(&self, key: &str, contents: &[u8]) -> Result<(), DocsignError> {
        let object_path = ObjectPath::parse(Self::clean_path(key))?;
        let payload = PutPayload::from(contents.to_vec());
        let storage = self.get_storage()?;
        block_on(storage.put(&object_path, payload))?;
        debug!("stored {} bytes under '{}'", contents.len(), key);
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, DocsignError> {
        let object_path = ObjectPath::parse(Self::clean_path(key))?;
        let storage = self.get_storage()?;
        match block_on(storage.get(&object_path)) {
            Ok(get_result) => {
                let bytes = block_on(get_result.bytes())?;
                Ok(Some(bytes.to_vec()))
            }
            Err(ObjectStoreError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn remove(&self, key: &str) -> Result<(), DocsignError> {
        let object_path = ObjectPath::parse(Self::clean_path(key))?;
        let storage = self.get_storage()?;
        match block_on(storage.delete(&object_path)) {
            Ok(()) | Err(ObjectStoreError::NotFound { .. }) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
