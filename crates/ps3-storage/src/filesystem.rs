//! The filesystem storage backend.
//!
//! `<root>/<bucket>/` is a bucket; `<root>/<bucket>/<key>` is an object,
//! where `/` inside a key becomes nested directories. Timestamps come from
//! the filesystem's own modification times rather than a side-table, so
//! there is nothing to keep in sync: `creation_date` is the bucket
//! directory's mtime, `last_modified` is the object file's mtime.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use chrono::{DateTime, Utc};

use ps3_s3_model::{BucketSummary, ObjectSummary};

use crate::backend::{BackendFuture, StorageBackend, StorageRoot};
use crate::error::StorageError;

fn internal(context: &str, err: std::io::Error) -> StorageError {
    StorageError::Internal(format!("{context}: {err}"))
}

fn mtime_utc(metadata: &std::fs::Metadata) -> Result<DateTime<Utc>, StorageError> {
    let modified = metadata
        .modified()
        .map_err(|e| internal("reading mtime", e))?;
    Ok(DateTime::<Utc>::from(modified))
}

/// Object storage backed by the local filesystem, one directory per bucket.
#[derive(Debug, Clone)]
pub struct FilesystemBackend {
    root: PathBuf,
}

impl FilesystemBackend {
    /// Create a backend rooted at `root`. Does not touch the filesystem
    /// until [`StorageBackend::init`] is called.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn bucket_path(&self, bucket: &str) -> PathBuf {
        self.root.join(bucket)
    }

    /// Depth-first scan for any regular file under `dir`. Used to decide
    /// whether a bucket directory is "empty" in the object sense -- a
    /// bucket with only empty subdirectories (left behind by a prior
    /// delete) is still considered empty.
    fn contains_any_file(dir: &Path) -> std::io::Result<bool> {
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let file_type = entry.file_type()?;
            if file_type.is_dir() {
                if Self::contains_any_file(&entry.path())? {
                    return Ok(true);
                }
            } else {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Depth-first traversal yielding `(key, size, last_modified)` for every
    /// leaf file under `bucket_dir`, with keys reconstructed as `/`-joined
    /// path segments relative to `bucket_dir`.
    fn walk_objects(bucket_dir: &Path) -> std::io::Result<Vec<(String, u64, DateTime<Utc>)>> {
        fn recurse(
            base: &Path,
            dir: &Path,
            out: &mut Vec<(String, u64, DateTime<Utc>)>,
        ) -> std::io::Result<()> {
            for entry in std::fs::read_dir(dir)? {
                let entry = entry?;
                let path = entry.path();
                let file_type = entry.file_type()?;
                if file_type.is_dir() {
                    recurse(base, &path, out)?;
                } else {
                    let metadata = entry.metadata()?;
                    let relative = path.strip_prefix(base).unwrap_or(&path);
                    let key = relative
                        .components()
                        .map(|c| c.as_os_str().to_string_lossy().into_owned())
                        .collect::<Vec<_>>()
                        .join("/");
                    let modified = DateTime::<Utc>::from(
                        metadata
                            .modified()
                            .unwrap_or_else(|_| std::time::SystemTime::now()),
                    );
                    out.push((key, metadata.len(), modified));
                }
            }
            Ok(())
        }

        let mut out = Vec::new();
        recurse(bucket_dir, bucket_dir, &mut out)?;
        Ok(out)
    }
}

impl StorageBackend for FilesystemBackend {
    fn storage_root(&self) -> StorageRoot {
        StorageRoot::Directory(self.root.clone())
    }

    fn init(&self) -> BackendFuture<()> {
        let root = self.root.clone();
        Box::pin(async move {
            tokio::fs::create_dir_all(&root)
                .await
                .map_err(|e| internal("creating storage root", e))
        })
    }

    fn clean_up(&self) -> BackendFuture<()> {
        let root = self.root.clone();
        Box::pin(async move {
            let mut entries = tokio::fs::read_dir(&root)
                .await
                .map_err(|e| internal("reading storage root", e))?;
            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| internal("reading storage root", e))?
            {
                tokio::fs::remove_dir_all(entry.path())
                    .await
                    .map_err(|e| internal("removing bucket directory", e))?;
            }
            Ok(())
        })
    }

    fn list_buckets(&self) -> BackendFuture<Vec<BucketSummary>> {
        let root = self.root.clone();
        Box::pin(async move {
            let mut entries = tokio::fs::read_dir(&root)
                .await
                .map_err(|e| internal("reading storage root", e))?;
            let mut buckets = Vec::new();
            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| internal("reading storage root", e))?
            {
                if entry
                    .file_type()
                    .await
                    .map_err(|e| internal("reading bucket entry", e))?
                    .is_dir()
                {
                    let metadata = entry
                        .metadata()
                        .await
                        .map_err(|e| internal("reading bucket metadata", e))?;
                    buckets.push(BucketSummary {
                        name: entry.file_name().to_string_lossy().into_owned(),
                        creation_date: mtime_utc(&metadata)?,
                    });
                }
            }
            Ok(buckets)
        })
    }

    fn create_bucket(&self, name: String) -> BackendFuture<String> {
        let path = self.bucket_path(&name);
        Box::pin(async move {
            match tokio::fs::create_dir(&path).await {
                Ok(()) => Ok(name),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    Err(StorageError::BucketAlreadyExists(name))
                }
                Err(e) => Err(internal("creating bucket directory", e)),
            }
        })
    }

    fn delete_bucket(&self, name: String) -> BackendFuture<()> {
        let path = self.bucket_path(&name);
        Box::pin(async move {
            if tokio::fs::metadata(&path).await.is_err() {
                return Err(StorageError::NoSuchBucket(name));
            }
            let not_empty = tokio::task::spawn_blocking({
                let path = path.clone();
                move || FilesystemBackend::contains_any_file(&path)
            })
            .await
            .map_err(|e| StorageError::Internal(format!("join error: {e}")))?
            .map_err(|e| internal("scanning bucket directory", e))?;
            if not_empty {
                return Err(StorageError::BucketNotEmpty(name));
            }
            tokio::fs::remove_dir_all(&path)
                .await
                .map_err(|e| internal("removing bucket directory", e))
        })
    }

    fn list_objects(&self, bucket: String) -> BackendFuture<Vec<ObjectSummary>> {
        let path = self.bucket_path(&bucket);
        Box::pin(async move {
            if tokio::fs::metadata(&path).await.is_err() {
                return Err(StorageError::NoSuchBucket(bucket));
            }
            let entries = tokio::task::spawn_blocking(move || FilesystemBackend::walk_objects(&path))
                .await
                .map_err(|e| StorageError::Internal(format!("join error: {e}")))?
                .map_err(|e| internal("walking bucket directory", e))?;
            Ok(entries
                .into_iter()
                .map(|(key, size, last_modified)| ObjectSummary {
                    key,
                    size,
                    last_modified,
                })
                .collect())
        })
    }

    fn put_object(&self, bucket: String, key: String, bytes: Bytes) -> BackendFuture<String> {
        let bucket_path = self.bucket_path(&bucket);
        Box::pin(async move {
            if tokio::fs::metadata(&bucket_path).await.is_err() {
                return Err(StorageError::NoSuchBucket(bucket));
            }
            let file_path = bucket_path.join(&key);
            if let Some(parent) = file_path.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| internal("creating object directories", e))?;
            }
            tokio::fs::write(&file_path, &bytes)
                .await
                .map_err(|e| internal("writing object", e))?;
            Ok(key)
        })
    }

    fn get_object(&self, bucket: String, key: String) -> BackendFuture<Bytes> {
        let file_path = self.bucket_path(&bucket).join(&key);
        Box::pin(async move {
            tokio::fs::read(&file_path)
                .await
                .map(Bytes::from)
                .map_err(|_| StorageError::NoSuchKey(key))
        })
    }

    fn delete_object(&self, bucket: String, key: String) -> BackendFuture<()> {
        let file_path = self.bucket_path(&bucket).join(&key);
        Box::pin(async move {
            tokio::fs::remove_file(&file_path)
                .await
                .map_err(|_| StorageError::NoSuchKey(key))
        })
    }
}
