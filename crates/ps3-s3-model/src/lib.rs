//! Wire-facing data types and the S3 error taxonomy for the ps3 protocol
//! adapter: the subset of S3 this server actually implements (no multipart,
//! versioning, ACLs, or storage-class metadata).

pub mod error;
pub mod types;

pub use error::{S3Error, S3ErrorCode};
pub use types::{BucketSummary, ObjectSummary};
