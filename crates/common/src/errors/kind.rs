use connect_protocol::common::FailureType;
use std::fmt;

/// Machine readable error kinds reported to callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Runtime,
    MethodInvalidParameter,
    MethodNotAllowed,
    MethodCancel,
    DeviceDisconnected,
    /// A failure reported by the device, `None` if the code is unknown.
    Failure(Option<FailureType>),
}

impl ErrorKind {
    pub const fn code(self) -> &'static str {
        match self {
            Self::Runtime => "Runtime",
            Self::MethodInvalidParameter => "Method_InvalidParameter",
            Self::MethodNotAllowed => "Method_NotAllowed",
            Self::MethodCancel => "Method_Cancel",
            Self::DeviceDisconnected => "Device_Disconnected",
            Self::Failure(Some(code)) => code.code(),
            Self::Failure(None) => "Failure_Unknown",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
