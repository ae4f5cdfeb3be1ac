//! Request routing: path parsing and operation identification.
//!
//! Path-style addressing only (`/{bucket}/{key...}`) -- no virtual-hosted
//! bucket resolution, since this server has no domain to host under.
//! Operation identification distinguishes only the query parameter this
//! protocol subset actually understands: `list-type=2` for ListObjectsV2
//! and `delete` for BatchDelete.

use http::Method;
use percent_encoding::percent_decode_str;

/// A request that does not match any route this server understands.
///
/// Distinct from [`ps3_s3_model::S3Error`]: unmatched routes get a plain
/// "Not Found" text body, not the XML error document bucket/object
/// operations produce.
#[derive(Debug, Clone, Copy)]
pub struct Unroutable;

/// Which handler a request resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum S3Operation {
    ListBuckets,
    CreateBucket,
    DeleteBucket,
    HeadBucket,
    ListObjects,
    ListObjectsV2,
    BatchDelete,
    GetObject,
    HeadObject,
    PutObject,
    DeleteObject,
}

/// The outcome of routing a request: resolved bucket/key and the operation
/// to dispatch, plus the parsed query parameters (consulted again by
/// handlers for `prefix`).
#[derive(Debug, Clone)]
pub struct RoutingContext {
    pub bucket: Option<String>,
    pub key: Option<String>,
    pub operation: S3Operation,
    pub query_params: Vec<(String, String)>,
}

impl RoutingContext {
    /// The value of a query parameter, if present.
    #[must_use]
    pub fn query_value(&self, key: &str) -> Option<&str> {
        query_value(&self.query_params, key)
    }
}

/// Resolve an HTTP request's method and URI into a [`RoutingContext`].
///
/// # Errors
///
/// Returns [`Unroutable`] if the method/path combination cannot be mapped
/// to any operation this server implements.
pub fn resolve<B>(req: &http::Request<B>) -> Result<RoutingContext, Unroutable> {
    let method = req.method();
    let uri = req.uri();
    let headers = req.headers();

    let query_params = parse_query_params(uri.query().unwrap_or(""));
    let (bucket, key) = parse_path(uri.path());

    let operation = identify_operation(method, bucket.as_ref(), key.as_ref(), &query_params, headers)?;

    Ok(RoutingContext {
        bucket,
        key,
        operation,
        query_params,
    })
}

fn parse_path(path: &str) -> (Option<String>, Option<String>) {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    if trimmed.is_empty() {
        return (None, None);
    }

    if let Some(pos) = trimmed.find('/') {
        let bucket = decode_uri_component(&trimmed[..pos]);
        let key_raw = &trimmed[pos + 1..];
        let key = if key_raw.is_empty() {
            None
        } else {
            Some(decode_uri_component(key_raw))
        };
        (Some(bucket), key)
    } else {
        (Some(decode_uri_component(trimmed)), None)
    }
}

fn decode_uri_component(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().into_owned()
}

fn parse_query_params(query: &str) -> Vec<(String, String)> {
    if query.is_empty() {
        return Vec::new();
    }
    query
        .split('&')
        .filter(|s| !s.is_empty())
        .map(|pair| {
            if let Some(pos) = pair.find('=') {
                (
                    decode_uri_component(&pair[..pos]),
                    decode_uri_component(&pair[pos + 1..]),
                )
            } else {
                (decode_uri_component(pair), String::new())
            }
        })
        .collect()
}

fn query_has_key(params: &[(String, String)], key: &str) -> bool {
    params.iter().any(|(k, _)| k == key)
}

fn query_value<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
}

fn identify_operation(
    method: &Method,
    bucket: Option<&String>,
    key: Option<&String>,
    query_params: &[(String, String)],
    _headers: &http::HeaderMap,
) -> Result<S3Operation, Unroutable> {
    match (method, bucket.is_some(), key.is_some()) {
        (&Method::GET, false, false) => Ok(S3Operation::ListBuckets),
        (method, true, false) => identify_bucket_operation(method, query_params),
        (method, true, true) => identify_object_operation(method),
        (_, false, true) => Err(Unroutable),
        (_, false, false) => Err(Unroutable),
    }
}

fn identify_bucket_operation(method: &Method, params: &[(String, String)]) -> Result<S3Operation, Unroutable> {
    match *method {
        Method::GET => Ok(identify_bucket_get(params)),
        Method::PUT => Ok(S3Operation::CreateBucket),
        Method::DELETE => Ok(S3Operation::DeleteBucket),
        Method::HEAD => Ok(S3Operation::HeadBucket),
        Method::POST if query_has_key(params, "delete") => Ok(S3Operation::BatchDelete),
        _ => Err(Unroutable),
    }
}

fn identify_bucket_get(params: &[(String, String)]) -> S3Operation {
    if query_value(params, "list-type") == Some("2") {
        S3Operation::ListObjectsV2
    } else {
        S3Operation::ListObjects
    }
}

fn identify_object_operation(method: &Method) -> Result<S3Operation, Unroutable> {
    match *method {
        Method::GET => Ok(S3Operation::GetObject),
        Method::HEAD => Ok(S3Operation::HeadObject),
        Method::PUT => Ok(S3Operation::PutObject),
        Method::DELETE => Ok(S3Operation::DeleteObject),
        _ => Err(Unroutable),
    }
}
