//! S3 XML response/request shaping for `ps3`.
//!
//! `quick_xml` writer-closure style, S3 namespace and declaration
//! conventions, and a flat (non-wrapped) `<Error>` shape matching S3's
//! RestXml protocol. Covers the five response documents this server
//! produces (`ListAllMyBucketsResult`, `ListBucketResult` v1/v2,
//! `CopyObjectResult`, `DeleteResult`) plus the batch-delete request body
//! parser.

pub mod deserialize;
pub mod error;
pub mod serialize;

pub use deserialize::parse_batch_delete_keys;
pub use error::{XmlError, error_to_xml};
pub use serialize::{
    S3_NAMESPACE, copy_object_result_xml, delete_result_xml, list_all_my_buckets_xml,
    list_objects_xml,
};
