//! Tagged storage outcomes.
//!
//! Every backend operation returns one of these instead of the HTTP-facing
//! `ps3_s3_model::S3Error` -- the protocol adapter is the only place that
//! knows how to turn a storage outcome into a response: storage backends
//! return tagged outcomes, and the adapter pattern-matches and shapes
//! responses from them.

use ps3_s3_model::{S3Error, S3ErrorCode};

/// Errors a [`crate::backend::StorageBackend`] operation can return.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StorageError {
    /// `create_bucket` on a name that already exists.
    #[error("bucket already exists: {0}")]
    BucketAlreadyExists(String),

    /// An operation referenced a bucket that doesn't exist.
    #[error("no such bucket: {0}")]
    NoSuchBucket(String),

    /// `delete_bucket` on a bucket that still has objects.
    #[error("bucket not empty: {0}")]
    BucketNotEmpty(String),

    /// An operation referenced an object key that doesn't exist.
    #[error("no such key: {0}")]
    NoSuchKey(String),

    /// Any other internal fault (I/O failure, sandbox resolution failure,
    /// etc). The message is for logs only -- it must never reach an HTTP
    /// response body verbatim; backend-specific error text must never leak
    /// to a caller.
    #[error("internal storage error: {0}")]
    Internal(String),
}

impl From<StorageError> for S3Error {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::BucketAlreadyExists(name) => S3Error::bucket_already_exists(name),
            StorageError::NoSuchBucket(name) => S3Error::no_such_bucket(name),
            StorageError::BucketNotEmpty(name) => S3Error::bucket_not_empty(name),
            StorageError::NoSuchKey(key) => S3Error::no_such_key(key),
            StorageError::Internal(message) => {
                tracing::warn!(error = %message, "internal storage error mapped to generic 500");
                S3Error::new(S3ErrorCode::InternalError)
            }
        }
    }
}
