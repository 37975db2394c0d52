//! Commonly used errors

use connect_protocol::{DecodeError, MessageType, common::FailureType};

mod kind;
pub use kind::ErrorKind;

/// Errors raised by the transport or reported by the device during an exchange.
///
/// These are never retried; they end the running method.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("device disconnected")]
    Disconnected,
    #[error("cancelled")]
    Cancelled,
    #[error("{}", .message.as_deref().unwrap_or("device failure"))]
    Failure { code: Option<FailureType>, message: Option<String> },
    #[error("unexpected {got} response, expected one of: {}", format_kinds(.expected))]
    UnexpectedMessage { expected: Vec<MessageType>, got: String },
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// The error returned by device methods.
///
/// Every error has a machine readable [`ErrorKind`] and a human readable message.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("{0}")]
    Runtime(String),
    #[error("{0}")]
    InvalidParameter(String),
    #[error("{0}")]
    NotAllowed(String),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl ConnectError {
    pub fn runtime(msg: impl Into<String>) -> Self {
        Self::Runtime(msg.into())
    }

    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    pub fn not_allowed(msg: impl Into<String>) -> Self {
        Self::NotAllowed(msg.into())
    }

    /// Returns the machine readable kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Runtime(_) => ErrorKind::Runtime,
            Self::InvalidParameter(_) => ErrorKind::MethodInvalidParameter,
            Self::NotAllowed(_) => ErrorKind::MethodNotAllowed,
            Self::Transport(err) => match err {
                TransportError::Disconnected | TransportError::Io(_) => {
                    ErrorKind::DeviceDisconnected
                }
                TransportError::Cancelled => ErrorKind::MethodCancel,
                TransportError::Failure { code, .. } => ErrorKind::Failure(*code),
                TransportError::UnexpectedMessage { .. } | TransportError::Decode(_) => {
                    ErrorKind::Runtime
                }
            },
        }
    }

    /// Shorthand for `self.kind().code()`.
    pub fn code(&self) -> &'static str {
        self.kind().code()
    }
}

fn format_kinds(kinds: &[MessageType]) -> String {
    kinds.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        assert_eq!(ConnectError::runtime("boom").code(), "Runtime");
        assert_eq!(ConnectError::invalid_parameter("bad").code(), "Method_InvalidParameter");
        assert_eq!(ConnectError::not_allowed("old").code(), "Method_NotAllowed");

        let err = ConnectError::from(TransportError::Disconnected);
        assert_eq!(err.code(), "Device_Disconnected");
        let err = ConnectError::from(TransportError::Cancelled);
        assert_eq!(err.code(), "Method_Cancel");

        let err = ConnectError::from(TransportError::Failure {
            code: Some(FailureType::ActionCancelled),
            message: Some("Action cancelled by user".into()),
        });
        assert_eq!(err.code(), "Failure_ActionCancelled");
        assert_eq!(err.to_string(), "Action cancelled by user");
    }

    #[test]
    fn unexpected_message() {
        let err = TransportError::UnexpectedMessage {
            expected: vec![
                MessageType::EthereumTypedDataValueRequest,
                MessageType::EthereumTypedDataSignature,
            ],
            got: "EthereumTypedDataStructRequest".into(),
        };
        assert_eq!(
            err.to_string(),
            "unexpected EthereumTypedDataStructRequest response, expected one of: \
             EthereumTypedDataValueRequest, EthereumTypedDataSignature"
        );
        assert_eq!(ConnectError::from(err).kind(), ErrorKind::Runtime);
    }
}
