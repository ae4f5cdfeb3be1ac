//! Sandbox registry integration tests.
//!
//! The AWS SDK client has no ergonomic way to attach an arbitrary request
//! header, so these tests drive the server with `reqwest` directly to
//! exercise the `x-ps3-sandbox-owner` header end to end, alongside direct
//! calls into the registry returned by [`crate::spawn_memory_server`].

#[cfg(test)]
mod tests {
    use ps3_core::MemorySandboxMode;
    use ps3_sandbox::{StartOwnerOptions, encode_metadata};

    use crate::{s3_client, spawn_memory_server};

    const SANDBOX_OWNER_HEADER: &str = "x-ps3-sandbox-owner";

    #[tokio::test]
    async fn test_two_owners_see_isolated_buckets_over_http() {
        let server = spawn_memory_server(MemorySandboxMode::Auto).await;
        let registry = server
            .storage
            .memory_registry()
            .expect("memory backend has a registry")
            .clone();

        let owner_a = registry
            .start_owner(StartOwnerOptions::default())
            .await
            .expect("start owner a");
        let owner_b = registry
            .start_owner(StartOwnerOptions::default())
            .await
            .expect("start owner b");

        let http = reqwest::Client::new();
        let base = server.endpoint_url();

        http.put(format!("{base}/owner-a-bucket"))
            .header(SANDBOX_OWNER_HEADER, encode_metadata(owner_a))
            .send()
            .await
            .expect("create bucket as owner a")
            .error_for_status()
            .expect("create bucket as owner a succeeds");

        http.put(format!("{base}/owner-b-bucket"))
            .header(SANDBOX_OWNER_HEADER, encode_metadata(owner_b))
            .send()
            .await
            .expect("create bucket as owner b")
            .error_for_status()
            .expect("create bucket as owner b succeeds");

        let list_as_a = http
            .get(format!("{base}/"))
            .header(SANDBOX_OWNER_HEADER, encode_metadata(owner_a))
            .send()
            .await
            .expect("list as owner a")
            .text()
            .await
            .expect("body as owner a");
        assert!(list_as_a.contains("owner-a-bucket"));
        assert!(!list_as_a.contains("owner-b-bucket"));

        let list_as_b = http
            .get(format!("{base}/"))
            .header(SANDBOX_OWNER_HEADER, encode_metadata(owner_b))
            .send()
            .await
            .expect("list as owner b")
            .text()
            .await
            .expect("body as owner b");
        assert!(list_as_b.contains("owner-b-bucket"));
        assert!(!list_as_b.contains("owner-a-bucket"));

        registry.stop_owner(owner_a);
        registry.stop_owner(owner_b);
    }

    #[tokio::test]
    async fn test_missing_owner_header_falls_back_to_auto_allocation() {
        let server = spawn_memory_server(MemorySandboxMode::Auto).await;
        let client = s3_client(&server);

        client
            .create_bucket()
            .bucket("unsandboxed-bucket")
            .send()
            .await
            .expect("create_bucket without a sandbox header still succeeds under Auto mode");
    }

    #[tokio::test]
    async fn test_stopped_owner_containers_become_unreachable() {
        let server = spawn_memory_server(MemorySandboxMode::Auto).await;
        let registry = server.storage.memory_registry().expect("registry").clone();

        let owner = registry
            .start_owner(StartOwnerOptions::default())
            .await
            .expect("start owner");

        let http = reqwest::Client::new();
        let base = server.endpoint_url();
        http.put(format!("{base}/stopped-owner-bucket"))
            .header(SANDBOX_OWNER_HEADER, encode_metadata(owner))
            .send()
            .await
            .expect("create bucket")
            .error_for_status()
            .expect("create bucket succeeds");

        registry.stop_owner(owner);

        // The owner id no longer resolves to any containers; a request
        // carrying it now falls back to a fresh auto-allocated owner that
        // has never seen this bucket.
        let resp = http
            .get(format!("{base}/stopped-owner-bucket"))
            .header(SANDBOX_OWNER_HEADER, encode_metadata(owner))
            .send()
            .await
            .expect("head request after stop");
        assert!(!resp.status().is_success());
    }
}
