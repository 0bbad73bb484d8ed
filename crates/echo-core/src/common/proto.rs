//! gRPC service and message definitions generated from `proto/echo.proto`.
//!
//! ## Service
//!
//! - `Echo` ([`echo_server::Echo`]) with the unary `Ping` method.
//!
//! ## Message Format
//!
//! - [`Message`] - A single `msg` string field, used as both request and
//!   response.

tonic::include_proto!("service");

/// Encoded `FileDescriptorSet` for `echo.proto`, registered with the
/// reflection service.
pub const FILE_DESCRIPTOR_SET: &[u8] = tonic::include_file_descriptor_set!("echo_descriptor");

/// Fully qualified gRPC name of the Echo service.
pub const SERVICE_NAME: &str = "service.Echo";

#[cfg(test)]
mod tests {
    use super::*;
    use tonic::server::NamedService;

    #[test]
    fn service_name_matches_generated_server() {
        assert_eq!(
            <echo_server::EchoServer<()> as NamedService>::NAME,
            SERVICE_NAME
        );
    }

    #[test]
    fn descriptor_set_is_not_empty() {
        assert!(!FILE_DESCRIPTOR_SET.is_empty());
    }

    #[test]
    fn default_message_has_empty_msg() {
        assert!(Message::default().msg.is_empty());
    }
}
