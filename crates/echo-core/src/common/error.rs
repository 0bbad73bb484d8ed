//! Error types for the Echo service.
//!
//! The service has a single failure kind, [`Error::Internal`], which is
//! surfaced to remote callers as a gRPC `INTERNAL` status through the
//! `From<Error> for Status` conversion.

use tonic::Status;

pub type Result<T> = core::result::Result<T, Error>;

/// Status message attached to the `INTERNAL` status returned by `Ping`.
pub const INTERNAL_MESSAGE: &str = "Internal";

/// Unified error type for the Echo service.
#[derive(Clone, thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    /// The call failed inside the service.
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl Error {
    /// The error raised by every `Ping` call.
    pub fn internal() -> Self {
        Self::Internal {
            message: INTERNAL_MESSAGE.to_string(),
        }
    }
}

impl From<Error> for Status {
    fn from(err: Error) -> Self {
        match err {
            Error::Internal { message } => Status::internal(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonic::Code;

    #[test]
    fn internal_maps_to_internal_status() {
        let status: Status = Error::internal().into();
        assert_eq!(status.code(), Code::Internal);
        assert_eq!(status.message(), INTERNAL_MESSAGE);
    }

    #[test]
    fn custom_message_is_carried_through() {
        let status: Status = Error::Internal {
            message: "worker died".to_string(),
        }
        .into();
        assert_eq!(status.code(), Code::Internal);
        assert_eq!(status.message(), "worker died");
    }

    #[test]
    fn display_includes_message() {
        assert_eq!(Error::internal().to_string(), "Internal error: Internal");
    }
}
