//! `hashStruct` for devices that sign pre-hashed typed data.

use super::{
    EIP712_DOMAIN, PrimitiveType, ResolvedType, TypeDictionary, TypedData, TypedDataError,
    TypedValue, encode_primitive, resolve_type,
};
use alloy_dyn_abi::{
    DynSolValue,
    eip712::{PropertyDef, Resolver, TypeDef},
};
use alloy_primitives::{Address, B256, I256, U256, keccak256};

/// Which `eth_signTypedData` flavour to hash with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HashVersion {
    /// Members without a value are left out of the encoding. Array values are rejected.
    V3,
    /// Arrays and nested arrays of structs. A struct member without a value encodes as a zero
    /// word, any other member must have a value.
    V4,
}

impl HashVersion {
    pub fn from_v4_compat(metamask_v4_compat: bool) -> Self {
        if metamask_v4_compat { Self::V4 } else { Self::V3 }
    }
}

/// Builds an alloy resolver over `types`, failing on any malformed definition.
fn resolver(types: &TypeDictionary) -> Result<Resolver, TypedDataError> {
    let mut resolver = Resolver::default();
    for (name, fields) in types.iter() {
        let props = fields
            .iter()
            .map(|field| PropertyDef::new(field.declared_type.as_str(), field.name.as_str()))
            .collect::<Result<Vec<_>, _>>()?;
        resolver.ingest(TypeDef::new(name, props)?);
    }
    Ok(resolver)
}

/// Computes `hashStruct(primary_type, value)`: the keccak256 of the type hash followed by the
/// encoded members.
///
/// Self-referencing structs are allowed, cycles through other structs are not.
pub fn hash_struct(
    types: &TypeDictionary,
    primary_type: &str,
    value: &TypedValue,
    version: HashVersion,
) -> Result<B256, TypedDataError> {
    let encoder = StructEncoder { types, resolver: resolver(types)?, version };
    let hash = encoder.hash_struct(primary_type, value)?;
    trace!(primary_type, ?version, %hash, "hashed struct");
    Ok(hash)
}

struct StructEncoder<'a> {
    types: &'a TypeDictionary,
    resolver: Resolver,
    version: HashVersion,
}

impl StructEncoder<'_> {
    fn hash_struct(&self, name: &str, value: &TypedValue) -> Result<B256, TypedDataError> {
        self.encode_data(name, value).map(keccak256)
    }

    /// `encodeData`: the type hash followed by one word per encoded member.
    fn encode_data(&self, name: &str, value: &TypedValue) -> Result<Vec<u8>, TypedDataError> {
        let fields =
            self.types.get(name).ok_or_else(|| TypedDataError::TypeNotDefined(name.to_string()))?;
        let members = value
            .as_object()
            .ok_or_else(|| TypedDataError::invalid_value(name, "expected an object"))?;

        let mut words = vec![DynSolValue::FixedBytes(self.resolver.type_hash(name)?, 32)];
        for field in fields {
            let resolved = resolve_type(&field.declared_type, self.types)?;
            let member = members.get(&field.name);
            let word = match self.version {
                HashVersion::V3 => match member {
                    Some(member) => self.encode_field_v3(&resolved, member)?,
                    None => continue,
                },
                HashVersion::V4 => self.encode_field_v4(&field.name, &resolved, member)?,
            };
            words.push(word);
        }
        Ok(DynSolValue::Tuple(words).abi_encode_params())
    }

    fn encode_field_v3(
        &self,
        resolved: &ResolvedType,
        value: &TypedValue,
    ) -> Result<DynSolValue, TypedDataError> {
        match resolved {
            ResolvedType::StructRef(name) => Ok(hashed(self.hash_struct(name, value)?)),
            ResolvedType::Array(..) => Err(TypedDataError::ArraysRequireV4),
            ResolvedType::Scalar(primitive) => encode_atomic(*primitive, value),
        }
    }

    fn encode_field_v4(
        &self,
        name: &str,
        resolved: &ResolvedType,
        value: Option<&TypedValue>,
    ) -> Result<DynSolValue, TypedDataError> {
        let value = match (resolved, value) {
            (ResolvedType::StructRef(_), None | Some(TypedValue::Null)) => {
                return Ok(hashed(B256::ZERO));
            }
            (_, Some(value)) => value,
            (_, None) => {
                return Err(TypedDataError::MissingField {
                    name: name.to_string(),
                    type_name: resolved.to_string(),
                });
            }
        };
        match resolved {
            ResolvedType::StructRef(struct_name) => {
                Ok(hashed(self.hash_struct(struct_name, value)?))
            }
            ResolvedType::Array(entry, _) => {
                let items = value
                    .as_array()
                    .ok_or_else(|| TypedDataError::invalid_value(resolved, "expected an array"))?;
                let words = items
                    .iter()
                    .map(|item| self.encode_field_v4(name, entry, Some(item)))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(hashed(keccak256(DynSolValue::Tuple(words).abi_encode_params())))
            }
            ResolvedType::Scalar(primitive) => encode_atomic(*primitive, value),
        }
    }
}

fn hashed(hash: B256) -> DynSolValue {
    DynSolValue::FixedBytes(hash, 32)
}

/// Encodes a leaf as its ABI word. Dynamic leaves are hashed.
fn encode_atomic(
    primitive: PrimitiveType,
    value: &TypedValue,
) -> Result<DynSolValue, TypedDataError> {
    let bytes = encode_primitive(primitive, value)?;
    Ok(match primitive {
        PrimitiveType::Bytes | PrimitiveType::String => hashed(keccak256(&bytes)),
        PrimitiveType::Uint(bits) => DynSolValue::Uint(U256::from_be_slice(&bytes), bits.into()),
        PrimitiveType::Int(bits) => {
            // sign extend the two's complement bytes to a full word
            let fill = if bytes.first().is_some_and(|b| b & 0x80 != 0) { 0xff } else { 0 };
            let mut word = [fill; 32];
            word[32 - bytes.len()..].copy_from_slice(&bytes);
            DynSolValue::Int(I256::from_raw(U256::from_be_bytes(word)), bits.into())
        }
        PrimitiveType::Address => {
            if bytes.len() != 20 {
                return Err(TypedDataError::invalid_value(primitive, "expected 20 bytes"));
            }
            DynSolValue::Address(Address::from_slice(&bytes))
        }
        PrimitiveType::FixedBytes(len) => {
            if bytes.len() > usize::from(len) {
                return Err(TypedDataError::invalid_value(primitive, "value too long"));
            }
            DynSolValue::FixedBytes(B256::right_padding_from(&bytes), len.into())
        }
        PrimitiveType::Bool => DynSolValue::Bool(bytes.first().is_some_and(|b| *b != 0)),
    })
}

/// The pair of hashes sent to legacy devices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TypedDataHashes {
    pub domain_separator_hash: B256,
    pub message_hash: B256,
}

impl TypedDataHashes {
    pub fn compute(data: &TypedData, version: HashVersion) -> Result<Self, TypedDataError> {
        Ok(Self {
            domain_separator_hash: hash_struct(&data.types, EIP712_DOMAIN, &data.domain, version)?,
            message_hash: hash_struct(&data.types, &data.primary_type, &data.message, version)?,
        })
    }
}
