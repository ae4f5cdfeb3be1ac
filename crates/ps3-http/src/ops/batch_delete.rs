//! POST `?delete`: delete a batch of keys from a single bucket.

use http::Response;

use ps3_storage::Storage;

use crate::body::S3ResponseBody;
use crate::response;

pub async fn batch_delete(storage: &Storage, bucket: &str, body: &[u8]) -> Response<S3ResponseBody> {
    let keys = match ps3_s3_xml::parse_batch_delete_keys(body) {
        Ok(keys) => keys,
        Err(e) => {
            return response::error_response(&ps3_s3_model::S3Error::internal_error(format!(
                "malformed batch-delete body: {e}"
            )));
        }
    };

    for key in &keys {
        // Individual failures (the key never existed) are ignored: every
        // requested key is reported deleted, matching idempotent-delete
        // semantics used throughout this server.
        let _ = storage.delete_object(bucket.to_owned(), key.clone()).await;
    }

    response::xml_ok(ps3_s3_xml::delete_result_xml(&keys))
}
