//! Request handlers, one module per S3 sub-resource area.

pub mod batch_delete;
pub mod bucket;
pub mod object;
