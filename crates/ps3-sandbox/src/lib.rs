//! A process-scoped ownership/allowance registry.
//!
//! Gives each concurrent test an isolated pair of in-memory storage
//! containers, addressable by the Tokio task identity of whichever task is
//! currently acting on the test's behalf (the test body itself, or an HTTP
//! handler task that has been granted access via [`Registry::allow`]).
//!
//! # Architecture
//!
//! ```text
//! test task ----checkout----> Registry -----owns-----> OwnerContainers<B, O>
//!    |                            ^
//!    | allow(child)               |
//!    v                            |
//! handler task ----lookup_owner---+
//! ```
//!
//! The registry is generic over the two container types (`B` for bucket
//! metadata, `O` for object records) so this crate has no dependency on the
//! concrete storage data model; `ps3-storage` instantiates it with its own
//! `DashMap`-based containers.

mod error;
mod metadata;
mod mode;
mod registry;

pub use error::SandboxError;
pub use metadata::{decode_metadata, encode_metadata};
pub use mode::Mode;
pub use registry::{CheckoutResult, OwnerContainers, OwnerId, Registry, StartOwnerOptions};

/// The opaque task identity used throughout this crate.
pub type TaskId = tokio::task::Id;
