//! Encoding of requested values into the bytes the device expects.

use super::{Numeric, PrimitiveType, ResolvedType, TypedDataError, TypedValue};
use alloy_primitives::{U256, hex};

/// Encodes `value` as a member of type `resolved`.
///
/// Arrays are announced by their element count only, as a big-endian `u16`; the elements are
/// requested one by one afterwards. Structs are never encoded as a whole.
pub fn encode_value(
    resolved: &ResolvedType,
    value: &TypedValue,
) -> Result<Vec<u8>, TypedDataError> {
    match resolved {
        ResolvedType::Scalar(primitive) => encode_primitive(*primitive, value),
        ResolvedType::Array(_, fixed_len) => {
            let items = value
                .as_array()
                .ok_or_else(|| TypedDataError::invalid_value(resolved, "expected an array"))?;
            if let Some(expected) = *fixed_len {
                if items.len() != expected {
                    return Err(TypedDataError::ArrayLengthMismatch {
                        type_name: resolved.to_string(),
                        expected,
                        actual: items.len(),
                    });
                }
            }
            Ok(encode_array_length(items.len())?.to_vec())
        }
        ResolvedType::StructRef(name) => {
            Err(TypedDataError::invalid_value(name, "a struct has no single encoded value"))
        }
    }
}

/// Encodes an array length as a big-endian `u16`.
pub fn encode_array_length(len: usize) -> Result<[u8; 2], TypedDataError> {
    u16::try_from(len).map(u16::to_be_bytes).map_err(|_| TypedDataError::ArrayTooLong(len))
}

/// Encodes a leaf value.
pub fn encode_primitive(
    primitive: PrimitiveType,
    value: &TypedValue,
) -> Result<Vec<u8>, TypedDataError> {
    let invalid = |reason: &str| TypedDataError::invalid_value(primitive, reason);
    match primitive {
        PrimitiveType::Uint(bits) => {
            let (negative, magnitude) =
                integer(value).ok_or_else(|| invalid("expected an integer"))?;
            if negative && !magnitude.is_zero() {
                return Err(invalid("negative values are not allowed"));
            }
            if magnitude.bit_len() > usize::from(bits) {
                return Err(invalid("value out of range"));
            }
            Ok(truncate_be(magnitude, bits))
        }
        PrimitiveType::Int(bits) => {
            let (negative, magnitude) =
                integer(value).ok_or_else(|| invalid("expected an integer"))?;
            let limit = U256::from(1u8) << (usize::from(bits) - 1);
            let in_range = if negative { magnitude <= limit } else { magnitude < limit };
            if !in_range {
                return Err(invalid("value out of range"));
            }
            // two's complement
            let raw = if negative { (!magnitude).wrapping_add(U256::from(1u8)) } else { magnitude };
            Ok(truncate_be(raw, bits))
        }
        PrimitiveType::Bytes | PrimitiveType::FixedBytes(_) | PrimitiveType::Address => {
            match value {
                TypedValue::Bytes(bytes) => Ok(bytes.clone()),
                TypedValue::String(s) => hex::decode(s).map_err(|err| invalid(&err.to_string())),
                _ => Err(invalid("expected a hex string or bytes")),
            }
        }
        PrimitiveType::String => match value {
            TypedValue::String(s) => Ok(s.as_bytes().to_vec()),
            _ => Err(invalid("expected a string")),
        },
        PrimitiveType::Bool => match value {
            TypedValue::Bool(b) => Ok(vec![u8::from(*b)]),
            TypedValue::Number(n) => Ok(vec![u8::from(!n.is_zero())]),
            _ => Err(invalid("expected a boolean")),
        },
    }
}

/// Last `bits / 8` bytes of the big-endian representation.
fn truncate_be(value: U256, bits: u16) -> Vec<u8> {
    let bytes = value.to_be_bytes::<32>();
    bytes[32 - usize::from(bits / 8)..].to_vec()
}

/// Sign and magnitude of an integer given as a number, a decimal string or a `0x` hex string.
fn integer(value: &TypedValue) -> Option<(bool, U256)> {
    match value {
        TypedValue::Number(Numeric::Fixed(n)) => Some((*n < 0, U256::from(n.unsigned_abs()))),
        TypedValue::Number(Numeric::Big(digits)) => parse_integer(digits),
        TypedValue::String(s) => parse_integer(s),
        _ => None,
    }
}

fn parse_integer(s: &str) -> Option<(bool, U256)> {
    let (negative, unsigned) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let hex_digits = unsigned.strip_prefix("0x").or_else(|| unsigned.strip_prefix("0X"));
    let (digits, radix) = match hex_digits {
        Some(hex) => (hex, 16),
        None => (unsigned, 10),
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix as u32)) {
        return None;
    }
    U256::from_str_radix(digits, radix).ok().map(|magnitude| (negative, magnitude))
}
