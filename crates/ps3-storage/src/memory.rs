//! The in-process memory storage backend.
//!
//! Two containers back every instance: a bucket-metadata map and an
//! object-record map keyed by `(bucket, key)`. When the sandbox registry is
//! enabled (`memory_sandbox_mode` is anything but `off`), the containers
//! used for any given call are resolved per-task through
//! [`ps3_sandbox::Registry`]; otherwise a single well-known pair is shared
//! process-wide.

use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry as DashEntry;

use ps3_core::MemorySandboxMode;
use ps3_s3_model::{BucketSummary, ObjectSummary};
use ps3_sandbox::{Mode, OwnerContainers, Registry, TaskId};

use crate::backend::{BackendFuture, StorageBackend, StorageRoot};
use crate::error::StorageError;

#[derive(Debug, Clone)]
struct BucketRecord {
    creation_date: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct ObjectRecord {
    bytes: Bytes,
    size: u64,
    last_modified: DateTime<Utc>,
}

/// Bucket-metadata container: name -> record.
pub type BucketMap = DashMap<String, BucketRecord>;
/// Object-record container: `(bucket, key)` -> record.
pub type ObjectMap = DashMap<(String, String), ObjectRecord>;

fn sandbox_mode(config_mode: &MemorySandboxMode) -> Mode {
    match config_mode {
        MemorySandboxMode::Off => Mode::Off,
        MemorySandboxMode::Auto => Mode::Auto,
        MemorySandboxMode::Manual => Mode::Manual,
        MemorySandboxMode::Shared(token) => match ps3_sandbox::decode_metadata(token) {
            Ok(owner) => Mode::Shared(owner),
            Err(_) => {
                tracing::warn!(
                    token = %token,
                    "MEMORY_SANDBOX_MODE shared token does not decode to an owner id, falling back to auto"
                );
                Mode::Auto
            }
        },
    }
}

/// Object storage kept entirely in process memory.
#[derive(Debug)]
pub struct MemoryBackend {
    registry: Arc<Registry<BucketMap, ObjectMap>>,
    well_known: OwnerContainers<BucketMap, ObjectMap>,
}

impl MemoryBackend {
    /// Create a backend whose sandboxing behavior follows `mode`.
    #[must_use]
    pub fn new(mode: &MemorySandboxMode) -> Self {
        Self {
            registry: Arc::new(Registry::with_mode(sandbox_mode(mode))),
            well_known: OwnerContainers {
                buckets: Arc::new(BucketMap::new()),
                objects: Arc::new(ObjectMap::new()),
            },
        }
    }

    /// The sandbox registry backing this instance, for the allowance
    /// interceptor and any direct test-harness use (checkout, allow,
    /// `start_owner!`, ...).
    #[must_use]
    pub fn registry(&self) -> Arc<Registry<BucketMap, ObjectMap>> {
        Arc::clone(&self.registry)
    }

    fn current_containers(&self) -> Result<OwnerContainers<BucketMap, ObjectMap>, StorageError> {
        if !self.registry.enabled() {
            return Ok(self.well_known.clone());
        }
        let task: TaskId = tokio::task::try_id().ok_or_else(|| {
            StorageError::Internal("memory backend used outside a tokio task".to_owned())
        })?;
        self.registry
            .resolve_containers(task)
            .map_err(|e| StorageError::Internal(e.to_string()))
    }
}

impl StorageBackend for MemoryBackend {
    fn storage_root(&self) -> StorageRoot {
        StorageRoot::InMemory
    }

    fn init(&self) -> BackendFuture<()> {
        // Container resolution already happens lazily and idempotently on
        // every call (`current_containers`); nothing needs to be
        // materialized up front beyond the well-known pair, which already
        // exists from `new()`. Resolving once here simply pre-warms an
        // Auto-mode owner record for whichever task calls `init()`.
        let result = self.current_containers();
        Box::pin(async move {
            let _ = result;
            Ok(())
        })
    }

    fn clean_up(&self) -> BackendFuture<()> {
        let containers = self.current_containers();
        Box::pin(async move {
            let containers = containers?;
            containers.buckets.clear();
            containers.objects.clear();
            Ok(())
        })
    }

    fn list_buckets(&self) -> BackendFuture<Vec<BucketSummary>> {
        let containers = self.current_containers();
        Box::pin(async move {
            let containers = containers?;
            Ok(containers
                .buckets
                .iter()
                .map(|e| BucketSummary {
                    name: e.key().clone(),
                    creation_date: e.value().creation_date,
                })
                .collect())
        })
    }

    fn create_bucket(&self, name: String) -> BackendFuture<String> {
        let containers = self.current_containers();
        Box::pin(async move {
            let containers = containers?;
            match containers.buckets.entry(name.clone()) {
                DashEntry::Occupied(_) => Err(StorageError::BucketAlreadyExists(name)),
                DashEntry::Vacant(v) => {
                    v.insert(BucketRecord {
                        creation_date: Utc::now(),
                    });
                    Ok(name)
                }
            }
        })
    }

    fn delete_bucket(&self, name: String) -> BackendFuture<()> {
        let containers = self.current_containers();
        Box::pin(async move {
            let containers = containers?;
            if !containers.buckets.contains_key(&name) {
                return Err(StorageError::NoSuchBucket(name));
            }
            if containers.objects.iter().any(|e| e.key().0 == name) {
                return Err(StorageError::BucketNotEmpty(name));
            }
            containers.buckets.remove(&name);
            Ok(())
        })
    }

    fn list_objects(&self, bucket: String) -> BackendFuture<Vec<ObjectSummary>> {
        let containers = self.current_containers();
        Box::pin(async move {
            let containers = containers?;
            if !containers.buckets.contains_key(&bucket) {
                return Err(StorageError::NoSuchBucket(bucket));
            }
            Ok(containers
                .objects
                .iter()
                .filter(|e| e.key().0 == bucket)
                .map(|e| ObjectSummary {
                    key: e.key().1.clone(),
                    size: e.value().size,
                    last_modified: e.value().last_modified,
                })
                .collect())
        })
    }

    fn put_object(&self, bucket: String, key: String, bytes: Bytes) -> BackendFuture<String> {
        let containers = self.current_containers();
        Box::pin(async move {
            let containers = containers?;
            if !containers.buckets.contains_key(&bucket) {
                return Err(StorageError::NoSuchBucket(bucket));
            }
            let size = bytes.len() as u64;
            containers.objects.insert(
                (bucket, key.clone()),
                ObjectRecord {
                    bytes,
                    size,
                    last_modified: Utc::now(),
                },
            );
            Ok(key)
        })
    }

    fn get_object(&self, bucket: String, key: String) -> BackendFuture<Bytes> {
        let containers = self.current_containers();
        Box::pin(async move {
            let containers = containers?;
            containers
                .objects
                .get(&(bucket, key.clone()))
                .map(|e| e.value().bytes.clone())
                .ok_or(StorageError::NoSuchKey(key))
        })
    }

    fn delete_object(&self, bucket: String, key: String) -> BackendFuture<()> {
        let containers = self.current_containers();
        Box::pin(async move {
            let containers = containers?;
            containers
                .objects
                .remove(&(bucket, key.clone()))
                .map(|_| ())
                .ok_or(StorageError::NoSuchKey(key))
        })
    }
}
