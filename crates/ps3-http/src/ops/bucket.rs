//! Bucket-level handlers: ListBuckets, CreateBucket, DeleteBucket,
//! HeadBucket, ListObjects/ListObjectsV2.

use http::{Response, StatusCode};

use ps3_s3_model::S3Error;
use ps3_storage::Storage;

use crate::body::S3ResponseBody;
use crate::response;
use crate::router::RoutingContext;

pub async fn list_buckets(storage: &Storage) -> Response<S3ResponseBody> {
    match storage.list_buckets().await {
        Ok(buckets) => response::xml_ok(ps3_s3_xml::list_all_my_buckets_xml(&buckets)),
        Err(e) => response::error_response(&e.into()),
    }
}

pub async fn create_bucket(storage: &Storage, bucket: &str) -> Response<S3ResponseBody> {
    match storage.create_bucket(bucket.to_owned()).await {
        Ok(name) => {
            let mut response = response::empty_status(StatusCode::OK);
            response::set_location(&mut response, &name);
            response
        }
        Err(e) => response::error_response(&e.into()),
    }
}

pub async fn delete_bucket(storage: &Storage, bucket: &str) -> Response<S3ResponseBody> {
    match storage.delete_bucket(bucket.to_owned()).await {
        Ok(()) => response::empty_status(StatusCode::NO_CONTENT),
        Err(e) => response::error_response(&e.into()),
    }
}

/// Serves HeadBucket too: HEAD is normalized to GET upstream and has its
/// body stripped after the fact, so this only needs to report existence.
pub async fn head_bucket(storage: &Storage, bucket: &str) -> Response<S3ResponseBody> {
    match storage.list_objects(bucket.to_owned()).await {
        Ok(_) => response::empty_status(StatusCode::OK),
        Err(e) => response::error_response(&e.into()),
    }
}

pub async fn list_objects(storage: &Storage, ctx: &RoutingContext, v2: bool) -> Response<S3ResponseBody> {
    let Some(bucket) = ctx.bucket.as_deref() else {
        return response::error_response(&S3Error::internal_error("list_objects called without a bucket"));
    };
    let prefix = ctx.query_value("prefix").unwrap_or("");

    match storage.list_objects(bucket.to_owned()).await {
        Ok(mut objects) => {
            objects.retain(|o| o.key.starts_with(prefix));
            objects.sort_by(|a, b| a.key.cmp(&b.key));
            response::xml_ok(ps3_s3_xml::list_objects_xml(bucket, prefix, &objects, v2))
        }
        Err(e) => response::error_response(&e.into()),
    }
}
