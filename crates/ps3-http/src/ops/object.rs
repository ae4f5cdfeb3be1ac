//! Object-level handlers: GetObject, HeadObject, PutObject (plain and
//! copy), DeleteObject.

use digest::Digest;
use http::{HeaderMap, Response, StatusCode};

use ps3_storage::Storage;

use crate::body::S3ResponseBody;
use crate::response;

const COPY_SOURCE_HEADER: &str = "x-amz-copy-source";

/// Lowercase hex MD5 of `bytes`, quoted -- the ETag format this server uses.
fn compute_etag(bytes: &[u8]) -> String {
    let digest = md5::Md5::digest(bytes);
    format!("\"{}\"", hex::encode(digest))
}

pub async fn get_object(storage: &Storage, bucket: &str, key: &str) -> Response<S3ResponseBody> {
    match storage.get_object(bucket.to_owned(), key.to_owned()).await {
        Ok(bytes) => response::object_body(bytes),
        Err(e) => response::error_response(&e.into()),
    }
}

/// HeadObject reuses GetObject; HEAD normalization (upstream) discards the
/// body but Content-Length must still reflect the payload size, which
/// `object_body` already sets before any stripping happens.
pub async fn head_object(storage: &Storage, bucket: &str, key: &str) -> Response<S3ResponseBody> {
    get_object(storage, bucket, key).await
}

pub async fn put_object(
    storage: &Storage,
    bucket: &str,
    key: &str,
    headers: &HeaderMap,
    body: bytes::Bytes,
) -> Response<S3ResponseBody> {
    if let Some(copy_source) = headers.get(COPY_SOURCE_HEADER).and_then(|v| v.to_str().ok()) {
        return put_object_copy(storage, bucket, key, copy_source).await;
    }

    let etag = compute_etag(&body);
    match storage.put_object(bucket.to_owned(), key.to_owned(), body).await {
        Ok(_) => {
            let mut response = response::empty_status(StatusCode::OK);
            response::set_etag(&mut response, &etag);
            response
        }
        Err(e) => response::error_response(&e.into()),
    }
}

async fn put_object_copy(
    storage: &Storage,
    dest_bucket: &str,
    dest_key: &str,
    copy_source: &str,
) -> Response<S3ResponseBody> {
    let Some((src_bucket, src_key)) = parse_copy_source(copy_source) else {
        return response::error_response(&ps3_s3_model::S3Error::no_such_key(copy_source.to_owned()));
    };

    let payload = match storage.get_object(src_bucket.to_owned(), src_key.to_owned()).await {
        Ok(bytes) => bytes,
        Err(e) => return response::error_response(&e.into()),
    };

    let etag = compute_etag(&payload);
    match storage.put_object(dest_bucket.to_owned(), dest_key.to_owned(), payload).await {
        Ok(_) => response::xml_ok(ps3_s3_xml::copy_object_result_xml(&etag, &chrono::Utc::now())),
        Err(e) => response::error_response(&e.into()),
    }
}

/// Parse `x-amz-copy-source` into `(bucket, key)`: strip a leading `/`,
/// split at the first remaining `/`.
fn parse_copy_source(header: &str) -> Option<(&str, &str)> {
    let stripped = header.strip_prefix('/').unwrap_or(header);
    let pos = stripped.find('/')?;
    let (bucket, rest) = stripped.split_at(pos);
    let key = &rest[1..];
    if bucket.is_empty() || key.is_empty() {
        None
    } else {
        Some((bucket, key))
    }
}

pub async fn delete_object(storage: &Storage, bucket: &str, key: &str) -> Response<S3ResponseBody> {
    // DeleteObject is idempotent: a missing key is swallowed and still
    // reported as success, matching S3's delete semantics.
    let _ = storage.delete_object(bucket.to_owned(), key.to_owned()).await;
    response::empty_status(StatusCode::NO_CONTENT)
}
