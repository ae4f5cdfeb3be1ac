//! Integration tests for the ps3 S3-compatible storage server.
//!
//! Unlike a LocalStack-style integration suite that expects a server
//! already running on `localhost:4566`, this server's entire purpose is to
//! back automated tests, so each test spawns its own instance in-process
//! on an ephemeral port via [`spawn_memory_server`] or [`spawn_fs_server`]
//! and talks to it with a real `aws-sdk-s3` client.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::Once;

use aws_sdk_s3::Client;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as HttpConnBuilder;
use tokio::net::TcpListener;

use ps3_core::{MemorySandboxMode, StorageBackendKind};
use ps3_http::service::Ps3HttpService;
use ps3_storage::{MemoryBackend, Storage};

static INIT: Once = Once::new();

/// Initialize tracing (once) for the whole test binary.
fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// A server instance spawned for the duration of one test. Dropping it
/// aborts the accept loop; there is no graceful-shutdown concern for tests.
#[derive(Debug)]
pub struct TestServer {
    pub addr: SocketAddr,
    pub storage: Storage,
    accept_task: tokio::task::JoinHandle<()>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.accept_task.abort();
    }
}

impl TestServer {
    /// The base URL a client should point at.
    #[must_use]
    pub fn endpoint_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

/// Spawn a server backed by the given [`Storage`] on `127.0.0.1:0`.
async fn spawn(storage: Storage) -> TestServer {
    init_tracing();
    storage.init().await.expect("storage init");

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local_addr");
    let service = Ps3HttpService::new(storage.clone());

    let accept_task = tokio::spawn(async move {
        let http = HttpConnBuilder::new(TokioExecutor::new());
        loop {
            let Ok((stream, _peer)) = listener.accept().await else {
                continue;
            };
            let svc = service.clone();
            let conn = http.serve_connection(TokioIo::new(stream), svc);
            tokio::spawn(async move {
                let _ = conn.await;
            });
        }
    });

    TestServer { addr, storage, accept_task }
}

/// Spawn a server on the memory backend with the given sandbox mode.
pub async fn spawn_memory_server(mode: MemorySandboxMode) -> TestServer {
    let backend = Arc::new(MemoryBackend::new(&mode));
    spawn(Storage::from_memory_backend(backend)).await
}

/// Spawn a server on the filesystem backend, rooted at a fresh temp
/// directory that is cleaned up when the returned guard is dropped.
pub async fn spawn_fs_server() -> (TestServer, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = ps3_core::Ps3Config::builder()
        .storage_backend(StorageBackendKind::Filesystem)
        .storage_root(dir.path().to_string_lossy().into_owned())
        .build();
    let server = spawn(Storage::from_config(&config)).await;
    (server, dir)
}

/// Create a configured S3 client pointing at `server`.
#[must_use]
pub fn s3_client(server: &TestServer) -> Client {
    let creds = Credentials::new("test", "test", None, None, "integration-test");

    let config = aws_sdk_s3::config::Builder::new()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(creds)
        .endpoint_url(server.endpoint_url())
        .force_path_style(true)
        .build();

    Client::from_conf(config)
}

/// Generate a unique bucket name for a test.
#[must_use]
pub fn test_bucket_name(prefix: &str) -> String {
    let id = uuid::Uuid::new_v4().to_string()[..8].to_owned();
    format!("test-{prefix}-{id}")
}

/// Create a bucket and return its name.
pub async fn create_test_bucket(client: &Client, prefix: &str) -> String {
    let name = test_bucket_name(prefix);
    client
        .create_bucket()
        .bucket(&name)
        .send()
        .await
        .unwrap_or_else(|e| panic!("failed to create bucket {name}: {e}"));
    name
}

/// Delete every object in a bucket, then delete the bucket itself.
pub async fn cleanup_bucket(client: &Client, bucket: &str) {
    let Ok(resp) = client.list_objects_v2().bucket(bucket).send().await else {
        return;
    };
    for obj in resp.contents() {
        if let Some(key) = obj.key() {
            let _ = client.delete_object().bucket(bucket).key(key).send().await;
        }
    }
    let _ = client.delete_bucket().bucket(bucket).send().await;
}

mod test_bucket;
mod test_error;
mod test_list;
mod test_object;
mod test_sandbox;
