//! Turning handler outcomes into `http::Response<S3ResponseBody>`.

use http::header::{CONTENT_LENGTH, CONTENT_TYPE, ETAG, LOCATION};
use http::{HeaderValue, Response, StatusCode};

use ps3_s3_model::S3Error;

use crate::body::S3ResponseBody;

const XML_CONTENT_TYPE: &str = "application/xml";
const OCTET_STREAM_CONTENT_TYPE: &str = "application/octet-stream";

/// Build a `200 OK` XML response.
#[must_use]
pub fn xml_ok(xml: Vec<u8>) -> Response<S3ResponseBody> {
    xml_response(StatusCode::OK, xml)
}

/// Build an XML response with an explicit status code.
#[must_use]
pub fn xml_response(status: StatusCode, xml: Vec<u8>) -> Response<S3ResponseBody> {
    let mut response = Response::new(S3ResponseBody::from_xml(xml));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(XML_CONTENT_TYPE));
    response
}

/// Build a bare status response with no body, used for 204s.
#[must_use]
pub fn empty_status(status: StatusCode) -> Response<S3ResponseBody> {
    let mut response = Response::new(S3ResponseBody::empty());
    *response.status_mut() = status;
    response
}

/// Build the raw-bytes object body response for GetObject/HeadObject.
#[must_use]
pub fn object_body(bytes: bytes::Bytes) -> Response<S3ResponseBody> {
    let len = bytes.len();
    let mut response = Response::new(S3ResponseBody::from_bytes(bytes));
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(OCTET_STREAM_CONTENT_TYPE));
    if let Ok(value) = HeaderValue::from_str(&len.to_string()) {
        response.headers_mut().insert(CONTENT_LENGTH, value);
    }
    response
}

/// Set the `ETag` header (already quoted) on a response.
pub fn set_etag(response: &mut Response<S3ResponseBody>, etag: &str) {
    if let Ok(value) = HeaderValue::from_str(etag) {
        response.headers_mut().insert(ETAG, value);
    }
}

/// Set the `Location` header on a CreateBucket response.
pub fn set_location(response: &mut Response<S3ResponseBody>, bucket: &str) {
    if let Ok(value) = HeaderValue::from_str(&format!("/{bucket}")) {
        response.headers_mut().insert(LOCATION, value);
    }
}

/// Shape an [`S3Error`] into its uniform XML error document.
#[must_use]
pub fn error_response(err: &S3Error) -> Response<S3ResponseBody> {
    let xml = ps3_s3_xml::error_to_xml(err.code.as_str(), &err.message, err.resource.as_deref());
    xml_response(err.status_code(), xml)
}

/// The plain-text 404 for routes this server does not understand.
#[must_use]
pub fn not_found_plain() -> Response<S3ResponseBody> {
    let mut response = Response::new(S3ResponseBody::from_string("Not Found"));
    *response.status_mut() = StatusCode::NOT_FOUND;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    response
}

/// The generic 500 for faults that never reached the error taxonomy.
#[must_use]
pub fn internal_error_plain() -> Response<S3ResponseBody> {
    let mut response = Response::new(S3ResponseBody::from_string("Internal Server Error"));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    response
}
