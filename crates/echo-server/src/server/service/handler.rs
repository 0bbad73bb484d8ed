//! gRPC service implementation for the `Echo` contract.
//!
//! [`EchoService`] implements the generated [`Echo`] trait. Its only method,
//! `Ping`, fails every call with an `INTERNAL` status; the request payload is
//! never inspected.

use crate::server::telemetry::{increment_errors, increment_requests, record_ping_duration};
use echo_core::{
    Error,
    proto::{Message, echo_server::Echo},
};
use tonic::{Request, Response, Status};

/// Stateless handler for `service.Echo`.
///
/// Cheap to clone; every invocation is independent of every other.
#[derive(Clone, Copy, Debug, Default)]
pub struct EchoService;

impl EchoService {
    pub const fn new() -> Self {
        Self
    }
}

#[tonic::async_trait]
impl Echo for EchoService {
    /// Always fails with [`Error::Internal`].
    ///
    /// If `metrics` is enabled, emits the request counter, the error counter
    /// and the call duration.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, fields(msg_len = _req.get_ref().msg.len())))]
    async fn ping(&self, _req: Request<Message>) -> Result<Response<Message>, Status> {
        let start = std::time::Instant::now();
        increment_requests();

        let err = Error::internal();

        #[cfg(feature = "tracing")]
        tracing::debug!("Ping failed: {err}");

        increment_errors();
        record_ping_duration(start.elapsed().as_secs_f64() * 1000.0);
        Err(err.into())
    }
}
