//! List objects integration tests.

#[cfg(test)]
mod tests {
    use aws_sdk_s3::primitives::ByteStream;
    use ps3_core::MemorySandboxMode;

    use crate::{cleanup_bucket, create_test_bucket, s3_client, spawn_memory_server};

    async fn populate_bucket(client: &aws_sdk_s3::Client, bucket: &str) {
        let keys = [
            "photos/2024/jan/img1.jpg",
            "photos/2024/jan/img2.jpg",
            "photos/2024/feb/img3.jpg",
            "photos/2025/mar/img4.jpg",
            "documents/report.pdf",
            "documents/readme.txt",
            "root.txt",
        ];
        for key in keys {
            client
                .put_object()
                .bucket(bucket)
                .key(key)
                .body(ByteStream::from_static(b"x"))
                .send()
                .await
                .unwrap_or_else(|e| panic!("put {key}: {e}"));
        }
    }

    #[tokio::test]
    async fn test_should_list_objects_v2() {
        let server = spawn_memory_server(MemorySandboxMode::Off).await;
        let client = s3_client(&server);
        let bucket = create_test_bucket(&client, "listv2").await;
        populate_bucket(&client, &bucket).await;

        let resp = client
            .list_objects_v2()
            .bucket(&bucket)
            .send()
            .await
            .expect("list_objects_v2");

        assert_eq!(resp.key_count(), Some(7));

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    async fn test_should_list_with_prefix() {
        let server = spawn_memory_server(MemorySandboxMode::Off).await;
        let client = s3_client(&server);
        let bucket = create_test_bucket(&client, "prefix").await;
        populate_bucket(&client, &bucket).await;

        let resp = client
            .list_objects_v2()
            .bucket(&bucket)
            .prefix("photos/2024/")
            .send()
            .await
            .expect("list with prefix");

        assert_eq!(resp.key_count(), Some(3));

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    async fn test_should_list_empty_bucket() {
        let server = spawn_memory_server(MemorySandboxMode::Off).await;
        let client = s3_client(&server);
        let bucket = create_test_bucket(&client, "empty").await;

        let resp = client
            .list_objects_v2()
            .bucket(&bucket)
            .send()
            .await
            .expect("list empty");

        assert_eq!(resp.key_count(), Some(0));
        assert!(resp.contents().is_empty());

        cleanup_bucket(&client, &bucket).await;
    }
}
