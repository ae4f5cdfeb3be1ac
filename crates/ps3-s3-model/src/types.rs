//! Wire-facing summaries returned by list operations.
//!
//! A bucket is a name plus creation timestamp, an object summary is a key
//! plus size and last-modified timestamp. The storage backends
//! (`ps3-storage`) return these directly; nothing richer (ACLs, storage
//! class, owner) exists here because none of it is in scope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A bucket as reported by `ListBuckets`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketSummary {
    /// The bucket's name.
    pub name: String,
    /// When the bucket was created, UTC.
    pub creation_date: DateTime<Utc>,
}

/// An object as reported by `ListObjects`/`ListObjectsV2`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectSummary {
    /// The object's key, `/`-joined from its path segments.
    pub key: String,
    /// The object's payload size in bytes.
    pub size: u64,
    /// When the object was last written, UTC.
    pub last_modified: DateTime<Utc>,
}
