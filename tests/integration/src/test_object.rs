//! Object CRUD integration tests.

#[cfg(test)]
mod tests {
    use aws_sdk_s3::primitives::ByteStream;
    use bytes::Bytes;
    use ps3_core::MemorySandboxMode;

    use crate::{cleanup_bucket, create_test_bucket, s3_client, spawn_memory_server};

    #[tokio::test]
    async fn test_should_put_and_get_object() {
        let server = spawn_memory_server(MemorySandboxMode::Off).await;
        let client = s3_client(&server);
        let bucket = create_test_bucket(&client, "putget").await;

        let body = b"hello, ps3!";
        client
            .put_object()
            .bucket(&bucket)
            .key("greeting.txt")
            .body(ByteStream::from_static(body))
            .send()
            .await
            .expect("put_object");

        let resp = client
            .get_object()
            .bucket(&bucket)
            .key("greeting.txt")
            .send()
            .await
            .expect("get_object");

        assert_eq!(resp.content_length(), Some(body.len() as i64));

        let data = resp.body.collect().await.expect("collect body").into_bytes();
        assert_eq!(data.as_ref(), body);

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    async fn test_should_head_object() {
        let server = spawn_memory_server(MemorySandboxMode::Off).await;
        let client = s3_client(&server);
        let bucket = create_test_bucket(&client, "head").await;

        client
            .put_object()
            .bucket(&bucket)
            .key("file.bin")
            .body(ByteStream::from_static(b"binary data"))
            .send()
            .await
            .expect("put_object");

        let resp = client
            .head_object()
            .bucket(&bucket)
            .key("file.bin")
            .send()
            .await
            .expect("head_object");

        assert_eq!(resp.content_length(), Some(11));
        assert!(resp.e_tag().is_some(), "etag should be present");

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    async fn test_should_delete_object() {
        let server = spawn_memory_server(MemorySandboxMode::Off).await;
        let client = s3_client(&server);
        let bucket = create_test_bucket(&client, "del").await;

        client
            .put_object()
            .bucket(&bucket)
            .key("delete-me.txt")
            .body(ByteStream::from_static(b"temp"))
            .send()
            .await
            .expect("put_object");

        client
            .delete_object()
            .bucket(&bucket)
            .key("delete-me.txt")
            .send()
            .await
            .expect("delete_object");

        let result = client
            .get_object()
            .bucket(&bucket)
            .key("delete-me.txt")
            .send()
            .await;
        assert!(result.is_err(), "get after delete should fail");

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    async fn test_should_delete_objects_batch() {
        let server = spawn_memory_server(MemorySandboxMode::Off).await;
        let client = s3_client(&server);
        let bucket = create_test_bucket(&client, "batch").await;

        for i in 0..5 {
            client
                .put_object()
                .bucket(&bucket)
                .key(format!("file-{i}.txt"))
                .body(ByteStream::from_static(b"data"))
                .send()
                .await
                .expect("put_object");
        }

        let objects: Vec<aws_sdk_s3::types::ObjectIdentifier> = (0..5)
            .map(|i| {
                aws_sdk_s3::types::ObjectIdentifier::builder()
                    .key(format!("file-{i}.txt"))
                    .build()
                    .unwrap()
            })
            .collect();

        let delete = aws_sdk_s3::types::Delete::builder()
            .set_objects(Some(objects))
            .build()
            .unwrap();

        let resp = client
            .delete_objects()
            .bucket(&bucket)
            .delete(delete)
            .send()
            .await
            .expect("delete_objects");

        assert_eq!(resp.deleted().len(), 5, "should delete all 5 objects");

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    async fn test_should_copy_object() {
        let server = spawn_memory_server(MemorySandboxMode::Off).await;
        let client = s3_client(&server);
        let bucket = create_test_bucket(&client, "copy").await;

        let body = b"copy me";
        client
            .put_object()
            .bucket(&bucket)
            .key("original.txt")
            .body(ByteStream::from_static(body))
            .send()
            .await
            .expect("put_object");

        client
            .copy_object()
            .bucket(&bucket)
            .key("copied.txt")
            .copy_source(format!("{bucket}/original.txt"))
            .send()
            .await
            .expect("copy_object");

        let resp = client
            .get_object()
            .bucket(&bucket)
            .key("copied.txt")
            .send()
            .await
            .expect("get copied object");

        let data = resp.body.collect().await.expect("collect").into_bytes();
        assert_eq!(data.as_ref(), body);

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    async fn test_should_put_and_get_large_object() {
        let server = spawn_memory_server(MemorySandboxMode::Off).await;
        let client = s3_client(&server);
        let bucket = create_test_bucket(&client, "large").await;

        let data: Bytes = Bytes::from(vec![0xABu8; 1_048_576]);
        client
            .put_object()
            .bucket(&bucket)
            .key("large.bin")
            .body(ByteStream::from(data.clone()))
            .send()
            .await
            .expect("put large object");

        let resp = client
            .get_object()
            .bucket(&bucket)
            .key("large.bin")
            .send()
            .await
            .expect("get large object");

        assert_eq!(resp.content_length(), Some(1_048_576));

        let got = resp.body.collect().await.expect("collect").into_bytes();
        assert_eq!(got.len(), 1_048_576);
        assert!(got.iter().all(|&b| b == 0xAB));

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    async fn test_should_get_nonexistent_key_returns_error() {
        let server = spawn_memory_server(MemorySandboxMode::Off).await;
        let client = s3_client(&server);
        let bucket = create_test_bucket(&client, "nokey").await;

        let result = client
            .get_object()
            .bucket(&bucket)
            .key("does-not-exist")
            .send()
            .await;
        assert!(result.is_err());

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    async fn test_should_overwrite_object() {
        let server = spawn_memory_server(MemorySandboxMode::Off).await;
        let client = s3_client(&server);
        let bucket = create_test_bucket(&client, "overwrite").await;

        client
            .put_object()
            .bucket(&bucket)
            .key("file.txt")
            .body(ByteStream::from_static(b"version1"))
            .send()
            .await
            .expect("put v1");

        client
            .put_object()
            .bucket(&bucket)
            .key("file.txt")
            .body(ByteStream::from_static(b"version2"))
            .send()
            .await
            .expect("put v2");

        let resp = client
            .get_object()
            .bucket(&bucket)
            .key("file.txt")
            .send()
            .await
            .expect("get");

        let data = resp.body.collect().await.expect("collect").into_bytes();
        assert_eq!(data.as_ref(), b"version2");

        cleanup_bucket(&client, &bucket).await;
    }
}
