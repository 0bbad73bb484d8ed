//! Shared definitions for the Echo service.
//!
//! - [`proto`] - Generated protobuf bindings and the reflection descriptor set.
//! - [`error`] - Service error type and its gRPC status mapping.

mod error;
pub mod proto;

pub use error::*;
