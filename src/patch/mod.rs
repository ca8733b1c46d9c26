//! PATCH support (RFC 7644 §3.5.2).
//!
//! [`PatchRequest`] is the wire message; [`PatchEngine`] applies its
//! operations to a resource representation, all or nothing.

pub mod engine;
pub mod errors;
pub mod operation;

pub use engine::PatchEngine;
pub use errors::PatchError;
pub use operation::{PATCH_OP_SCHEMA, PatchOp, PatchOperation, PatchRequest};
