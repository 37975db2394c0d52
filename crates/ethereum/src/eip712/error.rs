use connect_common::ConnectError;

/// Errors raised while resolving, encoding or hashing typed data.
///
/// All of them end the signing session and surface as `Runtime` errors.
#[derive(Debug, thiserror::Error)]
pub enum TypedDataError {
    #[error("Type {0} was not defined in types object")]
    TypeNotDefined(String),
    #[error("Root index can only be 0 or 1, got {0}")]
    InvalidRootIndex(u32),
    #[error("Member path is empty")]
    EmptyMemberPath,
    #[error("Member path {path:?} is deeper than the maximum of {max} indices")]
    MemberPathTooDeep { path: Vec<u32>, max: usize },
    #[error("Member index {index} is out of range for type {type_name}")]
    MemberIndexOutOfRange { type_name: String, index: u32 },
    #[error("Member path {path:?} descends into non-container type {type_name}")]
    NotAContainer { path: Vec<u32>, type_name: String },
    #[error("No value for member path {path:?}")]
    MissingValue { path: Vec<u32> },
    #[error("Invalid {type_name} value: {reason}")]
    InvalidValue { type_name: String, reason: String },
    #[error("Array of {0} elements exceeds the maximum length of 65535")]
    ArrayTooLong(usize),
    #[error("Array type {type_name} expects {expected} elements, got {actual}")]
    ArrayLengthMismatch { type_name: String, expected: usize, actual: usize },
    #[error("Invalid number {0}: only integers are supported")]
    NonIntegerNumber(String),
    #[error("missing value for field {name} of type {type_name}")]
    MissingField { name: String, type_name: String },
    #[error("Arrays are unimplemented in encodeData; use V4 extension")]
    ArraysRequireV4,
    #[error(transparent)]
    Hash(#[from] alloy_dyn_abi::Error),
}

impl TypedDataError {
    pub(crate) fn invalid_value(type_name: impl ToString, reason: impl Into<String>) -> Self {
        Self::InvalidValue { type_name: type_name.to_string(), reason: reason.into() }
    }
}

impl From<TypedDataError> for ConnectError {
    fn from(err: TypedDataError) -> Self {
        Self::Runtime(err.to_string())
    }
}
