//! Ethereum typed data (EIP-712) signing messages.

use crate::{MessageType, ProtocolMessage};

/// Request: start signing typed data, the device will ask for types and values.
#[derive(Clone, PartialEq, prost::Message)]
pub struct EthereumSignTypedData {
    #[prost(uint32, repeated, packed = "false", tag = "1")]
    pub address_n: Vec<u32>,
    #[prost(string, required, tag = "2")]
    pub primary_type: String,
    #[prost(bool, optional, tag = "3")]
    pub metamask_v4_compat: Option<bool>,
}

impl ProtocolMessage for EthereumSignTypedData {
    const MESSAGE_TYPE: MessageType = MessageType::EthereumSignTypedData;
}

/// Response: the device asks for the member layout of a named struct.
#[derive(Clone, PartialEq, prost::Message)]
pub struct EthereumTypedDataStructRequest {
    #[prost(string, required, tag = "1")]
    pub name: String,
}

impl ProtocolMessage for EthereumTypedDataStructRequest {
    const MESSAGE_TYPE: MessageType = MessageType::EthereumTypedDataStructRequest;
}

/// Request: the member layout of the requested struct.
#[derive(Clone, PartialEq, prost::Message)]
pub struct EthereumTypedDataStructAck {
    #[prost(message, repeated, tag = "1")]
    pub members: Vec<EthereumStructMember>,
}

impl ProtocolMessage for EthereumTypedDataStructAck {
    const MESSAGE_TYPE: MessageType = MessageType::EthereumTypedDataStructAck;
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct EthereumStructMember {
    #[prost(message, required, tag = "1")]
    pub field_type: EthereumFieldType,
    #[prost(string, required, tag = "2")]
    pub name: String,
}

/// Structural description of a member type, as understood by the firmware.
#[derive(Clone, PartialEq, prost::Message)]
pub struct EthereumFieldType {
    #[prost(enumeration = "EthereumDataType", required, tag = "1")]
    pub data_type: i32,
    /// Byte width of integers and fixed bytes, element count of fixed arrays, member count of
    /// structs.
    #[prost(uint32, optional, tag = "2")]
    pub size: Option<u32>,
    #[prost(message, optional, boxed, tag = "3")]
    pub entry_type: Option<Box<EthereumFieldType>>,
    #[prost(string, optional, tag = "4")]
    pub struct_name: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum EthereumDataType {
    Uint = 1,
    Int = 2,
    Bytes = 3,
    String = 4,
    Bool = 5,
    Address = 6,
    Array = 7,
    Struct = 8,
}

/// Response: the device asks for the value at `member_path`.
#[derive(Clone, PartialEq, prost::Message)]
pub struct EthereumTypedDataValueRequest {
    #[prost(uint32, repeated, packed = "false", tag = "1")]
    pub member_path: Vec<u32>,
}

impl ProtocolMessage for EthereumTypedDataValueRequest {
    const MESSAGE_TYPE: MessageType = MessageType::EthereumTypedDataValueRequest;
}

/// Request: the encoded value for the last value request.
#[derive(Clone, PartialEq, prost::Message)]
pub struct EthereumTypedDataValueAck {
    #[prost(bytes = "vec", required, tag = "1")]
    pub value: Vec<u8>,
}

impl ProtocolMessage for EthereumTypedDataValueAck {
    const MESSAGE_TYPE: MessageType = MessageType::EthereumTypedDataValueAck;
}

/// Response: the signed typed data.
#[derive(Clone, PartialEq, prost::Message)]
pub struct EthereumTypedDataSignature {
    #[prost(bytes = "vec", required, tag = "1")]
    pub signature: Vec<u8>,
    #[prost(string, required, tag = "2")]
    pub address: String,
}

impl ProtocolMessage for EthereumTypedDataSignature {
    const MESSAGE_TYPE: MessageType = MessageType::EthereumTypedDataSignature;
}

/// Request: sign a pre-hashed domain separator and message.
#[derive(Clone, PartialEq, prost::Message)]
pub struct EthereumSignTypedHash {
    #[prost(uint32, repeated, packed = "false", tag = "1")]
    pub address_n: Vec<u32>,
    #[prost(bytes = "vec", required, tag = "2")]
    pub domain_separator_hash: Vec<u8>,
    #[prost(bytes = "vec", optional, tag = "3")]
    pub message_hash: Option<Vec<u8>>,
}

impl ProtocolMessage for EthereumSignTypedHash {
    const MESSAGE_TYPE: MessageType = MessageType::EthereumSignTypedHash;
}

/// Response: signature in the message signing shape, sent by older legacy firmware in reply
/// to [`EthereumSignTypedHash`].
#[derive(Clone, PartialEq, prost::Message)]
pub struct EthereumMessageSignature {
    #[prost(bytes = "vec", required, tag = "2")]
    pub signature: Vec<u8>,
    #[prost(string, required, tag = "3")]
    pub address: String,
}

impl ProtocolMessage for EthereumMessageSignature {
    const MESSAGE_TYPE: MessageType = MessageType::EthereumMessageSignature;
}
