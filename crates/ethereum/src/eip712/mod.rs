//! EIP-712 typed data: the document model, type resolution, member paths, value encoding and
//! struct hashing.

mod error;
pub use error::TypedDataError;

mod types;
pub use types::{EIP712_DOMAIN, FieldDescriptor, TypeDictionary, TypedData};

mod value;
pub use value::{Numeric, TypedValue};

mod resolver;
pub use resolver::{PrimitiveType, ResolvedType, TypeGraph, parse_array_type, resolve_type};

mod encoder;
pub use encoder::{encode_array_length, encode_primitive, encode_value};

mod member;
pub use member::{ResolvedMember, resolve_member};

mod hash;
pub use hash::{HashVersion, TypedDataHashes, hash_struct};
