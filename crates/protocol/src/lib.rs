//! # connect-protocol
//!
//! Messages exchanged with the device and their type identifiers.
//!
//! Every message travels as an [`EncodedMessage`]: a numeric type id followed by the protobuf
//! encoding of the message body. Only the messages needed by the implemented methods are
//! declared here.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod message_type;
pub use message_type::MessageType;

pub mod common;
pub mod ethereum;

/// A message as it travels over a transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedMessage {
    /// Raw message type id.
    pub message_type: u16,
    /// Protobuf encoded message body.
    pub payload: Vec<u8>,
}

impl EncodedMessage {
    /// Returns the known message kind, if the type id is one we understand.
    pub fn kind(&self) -> Option<MessageType> {
        MessageType::from_repr(self.message_type)
    }

    /// Decodes the payload as `M`, checking that the type id matches.
    pub fn decode<M: ProtocolMessage>(&self) -> Result<M, DecodeError> {
        if self.message_type != M::MESSAGE_TYPE as u16 {
            return Err(DecodeError::UnexpectedType {
                expected: M::MESSAGE_TYPE,
                got: self.message_type,
            });
        }
        M::decode(self.payload.as_slice())
            .map_err(|source| DecodeError::Malformed { message_type: M::MESSAGE_TYPE, source })
    }
}

impl std::fmt::Display for EncodedMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind() {
            Some(kind) => write!(f, "{kind} ({} bytes)", self.payload.len()),
            None => {
                write!(f, "unknown message #{} ({} bytes)", self.message_type, self.payload.len())
            }
        }
    }
}

/// A protobuf message with a fixed wire type id.
pub trait ProtocolMessage: prost::Message + Default + Sized {
    /// The id this message is sent with.
    const MESSAGE_TYPE: MessageType;

    /// Encodes the message together with its type id.
    fn to_encoded(&self) -> EncodedMessage {
        EncodedMessage { message_type: Self::MESSAGE_TYPE as u16, payload: self.encode_to_vec() }
    }
}

/// Errors raised while decoding a received message.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("expected {expected} message, got message type #{got}")]
    UnexpectedType { expected: MessageType, got: u16 },
    #[error("malformed {message_type} payload: {source}")]
    Malformed {
        message_type: MessageType,
        #[source]
        source: prost::DecodeError,
    },
}
