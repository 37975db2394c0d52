//! Resolution of declared type strings against a [`TypeDictionary`].

use super::{EIP712_DOMAIN, TypeDictionary, TypedDataError};
use connect_protocol::ethereum::{EthereumDataType, EthereumFieldType};
use std::{collections::HashSet, fmt};

/// A primitive EIP-712 type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    /// `uintN`, N in bits.
    Uint(u16),
    /// `intN`, N in bits.
    Int(u16),
    /// `bytesN`, N in bytes.
    FixedBytes(u8),
    Bytes,
    String,
    Bool,
    Address,
}

impl PrimitiveType {
    /// Parses a primitive type name. Returns `None` for anything outside the vocabulary, which
    /// includes `uint`, `int` and `uint7`.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "bytes" => return Some(Self::Bytes),
            "string" => return Some(Self::String),
            "bool" => return Some(Self::Bool),
            "address" => return Some(Self::Address),
            _ => {}
        }
        if let Some(bits) = name.strip_prefix("uint").and_then(parse_size) {
            return (bits % 8 == 0 && (8..=256).contains(&bits)).then_some(Self::Uint(bits as u16));
        }
        if let Some(bits) = name.strip_prefix("int").and_then(parse_size) {
            return (bits % 8 == 0 && (8..=256).contains(&bits)).then_some(Self::Int(bits as u16));
        }
        if let Some(len) = name.strip_prefix("bytes").and_then(parse_size) {
            return (1..=32).contains(&len).then_some(Self::FixedBytes(len as u8));
        }
        None
    }

    /// Width in bytes of the encoded value, `None` for dynamic types.
    pub fn size(self) -> Option<u32> {
        match self {
            Self::Uint(bits) | Self::Int(bits) => Some(u32::from(bits / 8)),
            Self::FixedBytes(len) => Some(u32::from(len)),
            Self::Address => Some(20),
            Self::Bool => Some(1),
            Self::Bytes | Self::String => None,
        }
    }
}

/// Canonical decimal without sign or leading zeros.
fn parse_size(digits: &str) -> Option<usize> {
    if digits.is_empty() || digits.starts_with('0') || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uint(bits) => write!(f, "uint{bits}"),
            Self::Int(bits) => write!(f, "int{bits}"),
            Self::FixedBytes(len) => write!(f, "bytes{len}"),
            Self::Bytes => f.write_str("bytes"),
            Self::String => f.write_str("string"),
            Self::Bool => f.write_str("bool"),
            Self::Address => f.write_str("address"),
        }
    }
}

/// The structural shape of a declared type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ResolvedType {
    Scalar(PrimitiveType),
    /// Entry type and fixed length, if any.
    Array(Box<ResolvedType>, Option<usize>),
    StructRef(String),
}

impl ResolvedType {
    /// Returns the innermost non-array type.
    pub fn innermost(&self) -> &Self {
        match self {
            Self::Array(entry, _) => entry.innermost(),
            other => other,
        }
    }

    /// Builds the descriptor the device expects for a struct member of this type.
    pub fn field_type(&self, types: &TypeDictionary) -> Result<EthereumFieldType, TypedDataError> {
        let field = |data_type: EthereumDataType, size: Option<u32>| EthereumFieldType {
            data_type: data_type as i32,
            size,
            entry_type: None,
            struct_name: None,
        };
        Ok(match self {
            Self::Scalar(primitive) => match primitive {
                PrimitiveType::Uint(_) => field(EthereumDataType::Uint, primitive.size()),
                PrimitiveType::Int(_) => field(EthereumDataType::Int, primitive.size()),
                PrimitiveType::FixedBytes(_) => field(EthereumDataType::Bytes, primitive.size()),
                PrimitiveType::Bytes => field(EthereumDataType::Bytes, None),
                PrimitiveType::String => field(EthereumDataType::String, None),
                PrimitiveType::Bool => field(EthereumDataType::Bool, None),
                PrimitiveType::Address => field(EthereumDataType::Address, None),
            },
            Self::Array(entry, len) => EthereumFieldType {
                data_type: EthereumDataType::Array as i32,
                size: len.map(|len| len as u32),
                entry_type: Some(Box::new(entry.field_type(types)?)),
                struct_name: None,
            },
            Self::StructRef(name) => {
                let members = types
                    .get(name)
                    .ok_or_else(|| TypedDataError::TypeNotDefined(name.clone()))?;
                EthereumFieldType {
                    data_type: EthereumDataType::Struct as i32,
                    size: Some(members.len() as u32),
                    entry_type: None,
                    struct_name: Some(name.clone()),
                }
            }
        })
    }
}

impl fmt::Display for ResolvedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(primitive) => primitive.fmt(f),
            Self::Array(entry, Some(len)) => write!(f, "{entry}[{len}]"),
            Self::Array(entry, None) => write!(f, "{entry}[]"),
            Self::StructRef(name) => f.write_str(name),
        }
    }
}

/// Splits one trailing array suffix off `name`: `T[]` or `T[N]`.
///
/// Returns the entry type name and the fixed length, or `None` if `name` is not an array type.
pub fn parse_array_type(name: &str) -> Option<(&str, Option<usize>)> {
    let inner = name.strip_suffix(']')?;
    let open = inner.rfind('[')?;
    let (entry, len) = (&inner[..open], &inner[open + 1..]);
    if len.is_empty() {
        return Some((entry, None));
    }
    if !len.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    len.parse().ok().map(|len| (entry, Some(len)))
}

/// Resolves a declared type string.
///
/// Struct references must be defined in `types`. Only the referenced name is checked, the
/// referenced struct's own members are not visited.
pub fn resolve_type(
    declared: &str,
    types: &TypeDictionary,
) -> Result<ResolvedType, TypedDataError> {
    if let Some((entry, len)) = parse_array_type(declared) {
        return Ok(ResolvedType::Array(Box::new(resolve_type(entry, types)?), len));
    }
    if let Some(primitive) = PrimitiveType::parse(declared) {
        return Ok(ResolvedType::Scalar(primitive));
    }
    if types.contains(declared) {
        return Ok(ResolvedType::StructRef(declared.to_string()));
    }
    Err(TypedDataError::TypeNotDefined(declared.to_string()))
}

/// A view of a [`TypeDictionary`] as a graph of struct references.
#[derive(Clone, Copy, Debug)]
pub struct TypeGraph<'a> {
    types: &'a TypeDictionary,
}

impl<'a> TypeGraph<'a> {
    pub fn new(types: &'a TypeDictionary) -> Self {
        Self { types }
    }

    /// Checks that every struct reachable from `roots` is defined, resolving the type of every
    /// member of every reachable struct depth first in declaration order.
    ///
    /// Cycles are allowed; every struct is visited once.
    pub fn validate(&self, roots: &[&str]) -> Result<(), TypedDataError> {
        let mut visited = HashSet::new();
        let mut stack: Vec<String> = roots.iter().rev().map(|root| root.to_string()).collect();
        while let Some(name) = stack.pop() {
            if !visited.insert(name.clone()) {
                continue;
            }
            let fields =
                self.types.get(&name).ok_or_else(|| TypedDataError::TypeNotDefined(name.clone()))?;
            let mut refs = Vec::new();
            for field in fields {
                let resolved = resolve_type(&field.declared_type, self.types)?;
                if let ResolvedType::StructRef(name) = resolved.innermost() {
                    refs.push(name.clone());
                }
            }
            stack.extend(refs.into_iter().rev());
        }
        Ok(())
    }

    /// Validates the closure of the domain and the primary type.
    pub fn validate_document(&self, primary_type: &str) -> Result<(), TypedDataError> {
        self.validate(&[EIP712_DOMAIN, primary_type])
    }
}
