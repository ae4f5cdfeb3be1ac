//! ps3 server binary -- an S3-compatible storage server for development
//! and automated testing.
//!
//! # Usage
//!
//! ```text
//! GATEWAY_LISTEN=0.0.0.0:4566 ps3-server
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `GATEWAY_LISTEN` | `0.0.0.0:4566` | Bind address |
//! | `STORAGE_BACKEND` | `filesystem` | `filesystem` or `memory` |
//! | `STORAGE_ROOT` | `./.s3` | Root directory for the filesystem backend |
//! | `MEMORY_SANDBOX_MODE` | `off` | `off`, `auto`, `manual`, or `shared:<token>` |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

use std::net::SocketAddr;

use anyhow::{Context, Result};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as HttpConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use ps3_core::Ps3Config;
use ps3_http::service::Ps3HttpService;
use ps3_storage::Storage;

/// Server version reported in logs.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run the accept loop, serving connections until a shutdown signal is received.
async fn serve(listener: TcpListener, service: Ps3HttpService) -> Result<()> {
    let graceful = hyper_util::server::graceful::GracefulShutdown::new();
    let http = HttpConnBuilder::new(TokioExecutor::new());

    let shutdown = async {
        tokio::signal::ctrl_c().await.ok();
        info!("received shutdown signal, draining connections");
    };

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = listener.accept() => {
                let (stream, peer_addr) = match result {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!(error = %e, "failed to accept connection");
                        continue;
                    }
                };

                let svc = service.clone();
                let conn = http.serve_connection(TokioIo::new(stream), svc);
                let conn = graceful.watch(conn.into_owned());

                tokio::spawn(async move {
                    if let Err(e) = conn.await {
                        error!(peer_addr = %peer_addr, error = %e, "connection error");
                    }
                });
            }

            () = &mut shutdown => {
                info!("shutting down gracefully");
                break;
            }
        }
    }

    // Wait for in-flight requests to complete.
    graceful.shutdown().await;
    info!("all connections drained, exiting");

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Ps3Config::from_env();

    ps3_core::init_tracing(&config.log_level)?;

    info!(
        gateway_listen = %config.gateway_listen,
        storage_backend = ?config.storage_backend,
        storage_root = %config.storage_root,
        version = VERSION,
        "starting ps3 server",
    );

    let storage = Storage::from_config(&config);
    storage
        .init()
        .await
        .context("failed to initialize storage backend")?;

    let service = Ps3HttpService::new(storage);

    let addr: SocketAddr = config
        .gateway_listen
        .parse()
        .with_context(|| format!("invalid bind address: {}", config.gateway_listen))?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(%addr, "listening for connections");

    serve(listener, service).await
}
