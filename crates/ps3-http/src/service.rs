//! The hyper [`Service`] tying routing, the sandbox interceptor, dispatch,
//! and response shaping into a single request pipeline.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use http::{HeaderValue, Method, StatusCode};
use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::service::Service;
use uuid::Uuid;

use ps3_storage::Storage;

use crate::body::S3ResponseBody;
use crate::ops::{batch_delete, bucket, object};
use crate::response;
use crate::router::{self, S3Operation};
use crate::sandbox_interceptor;

const HEALTH_PATH: &str = "/_ps3/health";

/// The ps3 HTTP service. Cheap to clone: everything it holds is an `Arc`.
#[derive(Debug, Clone)]
pub struct Ps3HttpService {
    storage: Arc<Storage>,
}

impl Ps3HttpService {
    #[must_use]
    pub fn new(storage: Storage) -> Self {
        Self {
            storage: Arc::new(storage),
        }
    }
}

impl Service<http::Request<Incoming>> for Ps3HttpService {
    type Response = http::Response<S3ResponseBody>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<Incoming>) -> Self::Future {
        let storage = Arc::clone(&self.storage);
        Box::pin(async move {
            let request_id = Uuid::new_v4().to_string();
            let response = process_request(req, storage.as_ref()).await;
            Ok(add_common_headers(response, &request_id))
        })
    }
}

async fn process_request(req: http::Request<Incoming>, storage: &Storage) -> http::Response<S3ResponseBody> {
    let method = req.method().clone();
    let uri = req.uri().clone();
    tracing::debug!(%method, %uri, "processing request");

    if method == Method::GET && uri.path() == HEALTH_PATH {
        return health_check_response();
    }

    if let Some(registry) = storage.memory_registry() {
        sandbox_interceptor::apply(req.headers(), registry.as_ref());
    }

    // HEAD is serviced by routing as the equivalent GET, then stripping the
    // body afterward -- there is no separate set of HEAD handlers.
    let is_head = method == Method::HEAD;

    let ctx = match router::resolve(&req) {
        Ok(ctx) => ctx,
        Err(_unroutable) => {
            tracing::warn!(%method, %uri, "no route matched request");
            return response::not_found_plain();
        }
    };

    tracing::info!(operation = ?ctx.operation, bucket = ?ctx.bucket, key = ?ctx.key, "routed request");

    let (parts, incoming) = req.into_parts();
    let body = match incoming.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            tracing::error!(error = %e, "failed to collect request body");
            return response::internal_error_plain();
        }
    };

    let response = dispatch(storage, &ctx, &parts.headers, body).await;

    if is_head { strip_body(response) } else { response }
}

async fn dispatch(
    storage: &Storage,
    ctx: &router::RoutingContext,
    headers: &http::HeaderMap,
    body: bytes::Bytes,
) -> http::Response<S3ResponseBody> {
    match ctx.operation {
        S3Operation::ListBuckets => bucket::list_buckets(storage).await,
        S3Operation::CreateBucket => bucket::create_bucket(storage, bucket_name(ctx)).await,
        S3Operation::DeleteBucket => bucket::delete_bucket(storage, bucket_name(ctx)).await,
        S3Operation::HeadBucket => bucket::head_bucket(storage, bucket_name(ctx)).await,
        S3Operation::ListObjects => bucket::list_objects(storage, ctx, false).await,
        S3Operation::ListObjectsV2 => bucket::list_objects(storage, ctx, true).await,
        S3Operation::BatchDelete => batch_delete::batch_delete(storage, bucket_name(ctx), &body).await,
        S3Operation::GetObject => object::get_object(storage, bucket_name(ctx), key_name(ctx)).await,
        S3Operation::HeadObject => object::head_object(storage, bucket_name(ctx), key_name(ctx)).await,
        S3Operation::PutObject => object::put_object(storage, bucket_name(ctx), key_name(ctx), headers, body).await,
        S3Operation::DeleteObject => object::delete_object(storage, bucket_name(ctx), key_name(ctx)).await,
    }
}

fn bucket_name(ctx: &router::RoutingContext) -> &str {
    ctx.bucket.as_deref().unwrap_or_default()
}

fn key_name(ctx: &router::RoutingContext) -> &str {
    ctx.key.as_deref().unwrap_or_default()
}

fn strip_body(mut response: http::Response<S3ResponseBody>) -> http::Response<S3ResponseBody> {
    *response.body_mut() = S3ResponseBody::empty();
    response
}

fn health_check_response() -> http::Response<S3ResponseBody> {
    http::Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .body(S3ResponseBody::from_string(r#"{"status":"ok"}"#))
        .expect("static health response is valid")
}

fn add_common_headers(mut response: http::Response<S3ResponseBody>, request_id: &str) -> http::Response<S3ResponseBody> {
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(request_id) {
        headers.insert("x-amz-request-id", value);
    }
    headers.insert("Server", HeaderValue::from_static("ps3"));
    response
}
