//! The S3 protocol adapter: HTTP routing, request parsing, response shaping,
//! and the hyper service tying them together.
//!
//! - **Routing** ([`router`]): maps method + path + query onto an
//!   [`router::S3Operation`], path-style addressing only.
//! - **Operations** ([`ops`]): the handlers themselves, one module per
//!   sub-resource area (bucket, object, batch delete).
//! - **Response shaping** ([`response`]): turns handler results into HTTP
//!   responses, including XML-shaped S3 errors.
//! - **Body** ([`body`]): [`body::S3ResponseBody`], a buffered-or-empty
//!   `http_body::Body` implementation.
//! - **Sandbox interception** ([`sandbox_interceptor`]): binds the current
//!   handler task to a test's sandbox owner via the
//!   `x-ps3-sandbox-owner` header, before dispatch.
//! - **Service** ([`service`]): [`service::Ps3HttpService`], the
//!   `hyper::Service` that ties all of the above together.
//!
//! # Architecture
//!
//! ```text
//! HTTP request
//!   -> Ps3HttpService (hyper Service)
//!     -> health check short-circuit
//!     -> sandbox_interceptor::apply (memory backend only)
//!     -> router::resolve (HEAD folded to GET)
//!     -> body collection
//!     -> ops::* dispatch
//!     -> common response headers (x-amz-request-id, Server)
//! <- HTTP response
//! ```

pub mod body;
pub mod ops;
pub mod response;
pub mod router;
pub mod sandbox_interceptor;
pub mod service;

pub use body::S3ResponseBody;
pub use router::{RoutingContext, S3Operation};
pub use service::Ps3HttpService;
