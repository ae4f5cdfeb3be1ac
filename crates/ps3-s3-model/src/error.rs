//! The S3-facing error taxonomy.
//!
//! Storage backends never construct an [`S3Error`] directly -- they return
//! `ps3_storage::StorageError`, and the protocol adapter (`ps3-http`) maps
//! that into one of these.

use std::fmt;

/// The S3 error codes this server can produce.
///
/// `#[non_exhaustive]` so this can widen without breaking downstream
/// matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum S3ErrorCode {
    /// The bucket you tried to create already exists.
    BucketAlreadyExists,
    /// The specified bucket does not exist.
    NoSuchBucket,
    /// The bucket you tried to delete is not empty.
    BucketNotEmpty,
    /// The specified key does not exist.
    NoSuchKey,
    /// An unexpected internal failure; never carries backend-specific text.
    InternalError,
}

impl S3ErrorCode {
    /// The wire error code string, as it appears in `<Code>`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BucketAlreadyExists => "BucketAlreadyExists",
            Self::NoSuchBucket => "NoSuchBucket",
            Self::BucketNotEmpty => "BucketNotEmpty",
            Self::NoSuchKey => "NoSuchKey",
            Self::InternalError => "InternalError",
        }
    }

    /// The HTTP status code this error maps to.
    #[must_use]
    pub fn status_code(self) -> http::StatusCode {
        match self {
            Self::BucketAlreadyExists | Self::BucketNotEmpty => http::StatusCode::CONFLICT,
            Self::NoSuchBucket | Self::NoSuchKey => http::StatusCode::NOT_FOUND,
            Self::InternalError => http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The default human-readable message for this code.
    #[must_use]
    pub fn default_message(self) -> &'static str {
        match self {
            Self::BucketAlreadyExists => "The requested bucket name is not available",
            Self::NoSuchBucket => "The specified bucket does not exist",
            Self::BucketNotEmpty => "The bucket you tried to delete is not empty",
            Self::NoSuchKey => "The specified key does not exist",
            Self::InternalError => "We encountered an internal error, please try again",
        }
    }
}

impl fmt::Display for S3ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An S3 error response, ready to be shaped into XML by `ps3-s3-xml`.
#[derive(Debug, Clone, thiserror::Error)]
#[error("S3Error({code}): {message}")]
pub struct S3Error {
    /// The error code.
    pub code: S3ErrorCode,
    /// A human-readable message.
    pub message: String,
    /// The bucket or key this error concerns, if any.
    pub resource: Option<String>,
}

impl S3Error {
    /// Build an error from a code, using its default message.
    #[must_use]
    pub fn new(code: S3ErrorCode) -> Self {
        Self {
            code,
            message: code.default_message().to_owned(),
            resource: None,
        }
    }

    /// Attach the resource (bucket name or key) this error concerns.
    #[must_use]
    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// `NoSuchBucket`, scoped to a bucket name.
    #[must_use]
    pub fn no_such_bucket(bucket: impl Into<String>) -> Self {
        Self::new(S3ErrorCode::NoSuchBucket).with_resource(bucket)
    }

    /// `NoSuchKey`, scoped to an object key.
    #[must_use]
    pub fn no_such_key(key: impl Into<String>) -> Self {
        Self::new(S3ErrorCode::NoSuchKey).with_resource(key)
    }

    /// `BucketAlreadyExists`, scoped to a bucket name.
    #[must_use]
    pub fn bucket_already_exists(bucket: impl Into<String>) -> Self {
        Self::new(S3ErrorCode::BucketAlreadyExists).with_resource(bucket)
    }

    /// `BucketNotEmpty`, scoped to a bucket name.
    #[must_use]
    pub fn bucket_not_empty(bucket: impl Into<String>) -> Self {
        Self::new(S3ErrorCode::BucketNotEmpty).with_resource(bucket)
    }

    /// `InternalError` with a caller-supplied, non-backend-leaking message.
    #[must_use]
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self {
            code: S3ErrorCode::InternalError,
            message: message.into(),
            resource: None,
        }
    }

    /// The HTTP status code this error should be reported as.
    #[must_use]
    pub fn status_code(&self) -> http::StatusCode {
        self.code.status_code()
    }
}
