//! Messages shared by every method.

use crate::{MessageType, ProtocolMessage};

/// Response: the device failed to process the last request.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Failure {
    #[prost(enumeration = "FailureType", optional, tag = "1")]
    pub code: Option<i32>,
    #[prost(string, optional, tag = "2")]
    pub message: Option<String>,
}

impl ProtocolMessage for Failure {
    const MESSAGE_TYPE: MessageType = MessageType::Failure;
}

impl Failure {
    /// Returns the failure code, if it is a known one.
    pub fn failure_type(&self) -> Option<FailureType> {
        self.code.and_then(|code| FailureType::try_from(code).ok())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum FailureType {
    UnexpectedMessage = 1,
    ButtonExpected = 2,
    DataError = 3,
    ActionCancelled = 4,
    PinExpected = 5,
    PinCancelled = 6,
    PinInvalid = 7,
    InvalidSignature = 8,
    ProcessError = 9,
    NotEnoughFunds = 10,
    NotInitialized = 11,
    PinMismatch = 12,
    WipeCodeMismatch = 13,
    InvalidSession = 14,
    FirmwareError = 99,
}

impl FailureType {
    /// The machine readable code reported to callers.
    pub const fn code(self) -> &'static str {
        match self {
            Self::UnexpectedMessage => "Failure_UnexpectedMessage",
            Self::ButtonExpected => "Failure_ButtonExpected",
            Self::DataError => "Failure_DataError",
            Self::ActionCancelled => "Failure_ActionCancelled",
            Self::PinExpected => "Failure_PinExpected",
            Self::PinCancelled => "Failure_PinCancelled",
            Self::PinInvalid => "Failure_PinInvalid",
            Self::InvalidSignature => "Failure_InvalidSignature",
            Self::ProcessError => "Failure_ProcessError",
            Self::NotEnoughFunds => "Failure_NotEnoughFunds",
            Self::NotInitialized => "Failure_NotInitialized",
            Self::PinMismatch => "Failure_PinMismatch",
            Self::WipeCodeMismatch => "Failure_WipeCodeMismatch",
            Self::InvalidSession => "Failure_InvalidSession",
            Self::FirmwareError => "Failure_FirmwareError",
        }
    }
}

/// Response: the device is waiting for the user to press a button.
#[derive(Clone, PartialEq, prost::Message)]
pub struct ButtonRequest {
    #[prost(enumeration = "ButtonRequestType", optional, tag = "1")]
    pub code: Option<i32>,
    #[prost(uint32, optional, tag = "2")]
    pub pages: Option<u32>,
}

impl ProtocolMessage for ButtonRequest {
    const MESSAGE_TYPE: MessageType = MessageType::ButtonRequest;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum ButtonRequestType {
    Other = 1,
    FeeOverThreshold = 2,
    ConfirmOutput = 3,
    ResetDevice = 4,
    ConfirmWord = 5,
    WipeDevice = 6,
    ProtectCall = 7,
    SignTx = 8,
    FirmwareCheck = 9,
    Address = 10,
    PublicKey = 11,
}

/// Request: acknowledge a [`ButtonRequest`].
#[derive(Clone, PartialEq, prost::Message)]
pub struct ButtonAck {}

impl ProtocolMessage for ButtonAck {
    const MESSAGE_TYPE: MessageType = MessageType::ButtonAck;
}
