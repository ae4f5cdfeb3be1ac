//! Response XML documents, built with `quick_xml`'s writer-closure style
//! (`Writer::create_element(..).write_inner_content(|w| ..)`).
//!
//! Every document here corresponds 1:1 to a handler's response shape:
//! `ListAllMyBucketsResult` (ListBuckets), `ListBucketResult` (both
//! ListObjects and ListObjectsV2 share the shape; V2 adds `KeyCount`),
//! `CopyObjectResult` (PutObject copy mode), `DeleteResult` (BatchDelete).

use std::io::{self, Write};

use chrono::{DateTime, Utc};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesText, Event};

use ps3_s3_model::{BucketSummary, ObjectSummary};

/// The S3 XML namespace every response document is rooted in.
pub const S3_NAMESPACE: &str = "http://s3.amazonaws.com/doc/2006-03-01/";

fn write_text<W: Write>(writer: &mut Writer<W>, tag: &str, text: &str) -> io::Result<()> {
    writer
        .create_element(tag)
        .write_text_content(BytesText::new(text))?;
    Ok(())
}

/// Format a UTC timestamp as ISO-8601 with millisecond precision and a `Z`
/// suffix (`2006-02-03T16:45:09.000Z`).
fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

fn document<W, F>(root_element: &str, body: F) -> Result<Vec<u8>, io::Error>
where
    F: FnOnce(&mut Writer<&mut Vec<u8>>) -> io::Result<()>,
{
    let mut buf = Vec::with_capacity(512);
    {
        let mut writer = Writer::new(&mut buf);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        writer
            .create_element(root_element)
            .with_attribute(("xmlns", S3_NAMESPACE))
            .write_inner_content(body)?;
    }
    Ok(buf)
}

/// `ListAllMyBucketsResult` -- the body of a successful ListBuckets.
#[must_use]
pub fn list_all_my_buckets_xml(buckets: &[BucketSummary]) -> Vec<u8> {
    document("ListAllMyBucketsResult", |w| {
        w.create_element("Owner").write_inner_content(|w| {
            write_text(w, "ID", "ps3")?;
            write_text(w, "DisplayName", "ps3")
        })?;
        w.create_element("Buckets").write_inner_content(|w| {
            for bucket in buckets {
                w.create_element("Bucket").write_inner_content(|w| {
                    write_text(w, "Name", &bucket.name)?;
                    write_text(w, "CreationDate", &format_timestamp(&bucket.creation_date))
                })?;
            }
            Ok(())
        })
    })
    .unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to serialize ListAllMyBucketsResult");
        Vec::new()
    })
}

/// `ListBucketResult` for both ListObjects (v1) and ListObjectsV2. The only
/// difference between the two is the V2-only `<KeyCount>`.
#[must_use]
pub fn list_objects_xml(bucket: &str, prefix: &str, objects: &[ObjectSummary], v2: bool) -> Vec<u8> {
    document("ListBucketResult", |w| {
        write_text(w, "Name", bucket)?;
        write_text(w, "Prefix", prefix)?;
        if v2 {
            write_text(w, "KeyCount", &objects.len().to_string())?;
        }
        write_text(w, "IsTruncated", "false")?;
        for object in objects {
            w.create_element("Contents").write_inner_content(|w| {
                write_text(w, "Key", &object.key)?;
                write_text(w, "LastModified", &format_timestamp(&object.last_modified))?;
                write_text(w, "Size", &object.size.to_string())
            })?;
        }
        Ok(())
    })
    .unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to serialize ListBucketResult");
        Vec::new()
    })
}

/// `CopyObjectResult` -- the body of a successful PutObject copy.
#[must_use]
pub fn copy_object_result_xml(etag: &str, last_modified: &DateTime<Utc>) -> Vec<u8> {
    document("CopyObjectResult", |w| {
        write_text(w, "ETag", etag)?;
        write_text(w, "LastModified", &format_timestamp(last_modified))
    })
    .unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to serialize CopyObjectResult");
        Vec::new()
    })
}

/// `DeleteResult` -- the body of a successful BatchDelete. Every requested
/// key is reported `<Deleted>`, including ones that never existed, matching
/// the idempotent-delete semantics used throughout this server.
#[must_use]
pub fn delete_result_xml(deleted_keys: &[String]) -> Vec<u8> {
    document("DeleteResult", |w| {
        for key in deleted_keys {
            w.create_element("Deleted")
                .write_inner_content(|w| write_text(w, "Key", key))?;
        }
        Ok(())
    })
    .unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to serialize DeleteResult");
        Vec::new()
    })
}
