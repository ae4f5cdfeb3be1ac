//! The process-wide storage facade.
//!
//! Selects a [`StorageBackend`] from [`ps3_core::Ps3Config`] once at startup
//! and hands out a cheaply-cloneable handle to it. Every handler in
//! `ps3-http` holds one of these rather than talking to a concrete backend
//! directly.

use std::sync::Arc;

use bytes::Bytes;

use ps3_core::{Ps3Config, StorageBackendKind};
use ps3_s3_model::{BucketSummary, ObjectSummary};
use ps3_sandbox::Registry;

use crate::backend::{StorageBackend, StorageRoot};
use crate::error::StorageError;
use crate::filesystem::FilesystemBackend;
use crate::memory::{BucketMap, MemoryBackend, ObjectMap};

/// A cloneable handle to the selected storage backend.
#[derive(Debug, Clone)]
pub struct Storage {
    backend: Arc<dyn StorageBackend>,
    /// Populated only when the active backend is [`MemoryBackend`] --
    /// lets the protocol adapter's sandbox allowance interceptor reach
    /// the registry without downcasting the backend trait object.
    memory_registry: Option<Arc<Registry<BucketMap, ObjectMap>>>,
}

impl Storage {
    /// Build the storage facade from a loaded configuration, selecting and
    /// constructing the backend `config.storage_backend` names.
    #[must_use]
    pub fn from_config(config: &Ps3Config) -> Self {
        match &config.storage_backend {
            StorageBackendKind::Filesystem => {
                Self::new(Arc::new(FilesystemBackend::new(config.storage_root.clone())))
            }
            StorageBackendKind::Memory => {
                let memory = MemoryBackend::new(&config.memory_sandbox_mode);
                let registry = memory.registry();
                Self {
                    backend: Arc::new(memory),
                    memory_registry: Some(registry),
                }
            }
        }
    }

    /// Wrap an already-constructed backend directly, bypassing config
    /// selection. Used by tests that want a specific backend instance.
    ///
    /// A backend wrapped this way has no reachable sandbox registry; use
    /// [`Storage::from_config`] or [`Storage::from_memory_backend`] when
    /// the sandbox allowance interceptor needs one.
    #[must_use]
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            backend,
            memory_registry: None,
        }
    }

    /// Wrap a [`MemoryBackend`] directly, keeping its sandbox registry
    /// reachable via [`Storage::memory_registry`].
    #[must_use]
    pub fn from_memory_backend(backend: Arc<MemoryBackend>) -> Self {
        let registry = backend.registry();
        Self {
            backend,
            memory_registry: Some(registry),
        }
    }

    /// The active backend's sandbox registry, if it is a [`MemoryBackend`].
    #[must_use]
    pub fn memory_registry(&self) -> Option<&Arc<Registry<BucketMap, ObjectMap>>> {
        self.memory_registry.as_ref()
    }

    /// A backend-specific descriptor of where data lives.
    #[must_use]
    pub fn storage_root(&self) -> StorageRoot {
        self.backend.storage_root()
    }

    /// Prepare the backend for use. Idempotent.
    pub async fn init(&self) -> Result<(), StorageError> {
        self.backend.init().await
    }

    /// Drop every bucket and object visible to the caller.
    pub async fn clean_up(&self) -> Result<(), StorageError> {
        self.backend.clean_up().await
    }

    /// List every bucket.
    pub async fn list_buckets(&self) -> Result<Vec<BucketSummary>, StorageError> {
        self.backend.list_buckets().await
    }

    /// Create a bucket.
    pub async fn create_bucket(&self, name: String) -> Result<String, StorageError> {
        self.backend.create_bucket(name).await
    }

    /// Delete an empty bucket.
    pub async fn delete_bucket(&self, name: String) -> Result<(), StorageError> {
        self.backend.delete_bucket(name).await
    }

    /// List every object in a bucket.
    pub async fn list_objects(&self, bucket: String) -> Result<Vec<ObjectSummary>, StorageError> {
        self.backend.list_objects(bucket).await
    }

    /// Upsert an object's bytes.
    pub async fn put_object(
        &self,
        bucket: String,
        key: String,
        bytes: Bytes,
    ) -> Result<String, StorageError> {
        self.backend.put_object(bucket, key, bytes).await
    }

    /// Read an object's bytes.
    pub async fn get_object(&self, bucket: String, key: String) -> Result<Bytes, StorageError> {
        self.backend.get_object(bucket, key).await
    }

    /// Delete an object.
    pub async fn delete_object(&self, bucket: String, key: String) -> Result<(), StorageError> {
        self.backend.delete_object(bucket, key).await
    }
}
