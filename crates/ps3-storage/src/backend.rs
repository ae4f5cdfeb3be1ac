//! The storage backend contract.
//!
//! Every backend -- filesystem or memory -- implements the same ten
//! operations and returns the same tagged [`StorageError`] outcomes. The
//! trait uses plain `&self` methods returning a manually boxed future
//! rather than pulling in `async-trait`, so a `Facade` can hold
//! `Arc<dyn StorageBackend>` for dynamic dispatch.

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;

use ps3_s3_model::{BucketSummary, ObjectSummary};

use crate::error::StorageError;

/// A boxed, `Send`, `'static` future -- the return type of every
/// [`StorageBackend`] method.
pub type BackendFuture<T> = Pin<Box<dyn Future<Output = Result<T, StorageError>> + Send>>;

/// A backend-specific descriptor for where data physically lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageRoot {
    /// The filesystem backend's root directory.
    Directory(std::path::PathBuf),
    /// The memory backend has no on-disk location.
    InMemory,
}

/// The uniform storage contract every backend implements.
pub trait StorageBackend: Send + Sync + std::fmt::Debug + 'static {
    /// A backend-specific descriptor of where data lives.
    fn storage_root(&self) -> StorageRoot;

    /// Prepare the backend for use. Idempotent.
    fn init(&self) -> BackendFuture<()>;

    /// Drop every bucket and object visible to the caller.
    fn clean_up(&self) -> BackendFuture<()>;

    /// List every bucket.
    fn list_buckets(&self) -> BackendFuture<Vec<BucketSummary>>;

    /// Create a bucket. Fails with [`StorageError::BucketAlreadyExists`] if
    /// the name is already taken.
    fn create_bucket(&self, name: String) -> BackendFuture<String>;

    /// Delete an empty bucket. Fails with [`StorageError::NoSuchBucket`] or
    /// [`StorageError::BucketNotEmpty`].
    fn delete_bucket(&self, name: String) -> BackendFuture<()>;

    /// List every object in a bucket. Fails with
    /// [`StorageError::NoSuchBucket`] if the bucket doesn't exist.
    fn list_objects(&self, bucket: String) -> BackendFuture<Vec<ObjectSummary>>;

    /// Upsert an object's bytes. Fails with [`StorageError::NoSuchBucket`]
    /// if the bucket doesn't exist.
    fn put_object(&self, bucket: String, key: String, bytes: Bytes) -> BackendFuture<String>;

    /// Read an object's bytes. Fails with [`StorageError::NoSuchKey`] if
    /// missing (a missing bucket also surfaces as `NoSuchKey`, since there
    /// is nothing further to distinguish for a GET).
    fn get_object(&self, bucket: String, key: String) -> BackendFuture<Bytes>;

    /// Delete an object. Fails with [`StorageError::NoSuchKey`] if missing.
    fn delete_object(&self, bucket: String, key: String) -> BackendFuture<()>;
}
