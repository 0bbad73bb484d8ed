//! Server-side components of the Echo service.
//!
//! - [`config`] - CLI/env configuration and validation.
//! - [`events`] - Lifecycle listeners and the shared shutdown token.
//! - [`service`] - The `Echo` gRPC handler.
//! - [`telemetry`] - Logging, tracing and metrics setup.

pub mod config;
pub mod events;
pub mod service;
pub mod telemetry;
