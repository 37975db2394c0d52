//! BIP-32 derivation paths.

use crate::ConnectError;
use serde::{
    Deserialize, Deserializer, Serialize,
    de::{SeqAccess, Visitor},
};
use std::fmt;

/// Bit marking a hardened derivation index.
pub const HARDENED: u32 = 0x8000_0000;

/// Returns the hardened form of `index`.
pub const fn to_hardened(index: u32) -> u32 {
    index | HARDENED
}

/// Strips the hardened bit from `index`.
pub const fn from_hardened(index: u32) -> u32 {
    index & !HARDENED
}

/// A derivation path as supplied by the caller: either serialized (`m/44'/60'/0'/0/0`) or as a
/// list of raw indices.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PathParam {
    Serialized(String),
    Indices(Vec<u32>),
}

// Not derived: untagged buffering loses integers under `serde_json/arbitrary_precision`.
impl<'de> Deserialize<'de> for PathParam {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PathVisitor;

        impl<'de> Visitor<'de> for PathVisitor {
            type Value = PathParam;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a serialized derivation path or a list of indices")
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(PathParam::Serialized(v.to_string()))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut indices = Vec::with_capacity(seq.size_hint().unwrap_or(5));
                while let Some(index) = seq.next_element::<u32>()? {
                    indices.push(index);
                }
                Ok(PathParam::Indices(indices))
            }
        }

        deserializer.deserialize_any(PathVisitor)
    }
}

impl From<&str> for PathParam {
    fn from(path: &str) -> Self {
        Self::Serialized(path.to_string())
    }
}

impl From<Vec<u32>> for PathParam {
    fn from(path: Vec<u32>) -> Self {
        Self::Indices(path)
    }
}

impl From<&[u32]> for PathParam {
    fn from(path: &[u32]) -> Self {
        Self::Indices(path.to_vec())
    }
}

impl fmt::Display for PathParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Serialized(path) => f.write_str(path),
            Self::Indices(path) => f.write_str(&serialize_path(path)),
        }
    }
}

/// Parses a serialized path such as `m/44'/60'/0'/0/0`.
pub fn parse_path(path: &str) -> Result<Vec<u32>, ConnectError> {
    let lower = path.to_lowercase();
    let mut parts = lower.split('/');
    if parts.next() != Some("m") {
        return Err(ConnectError::invalid_parameter("Not a valid path"));
    }
    parts
        .filter(|part| !part.is_empty())
        .map(|part| {
            let (digits, hardened) = match part.strip_suffix('\'') {
                Some(digits) => (digits, true),
                None => (part, false),
            };
            let index: u32 =
                digits.parse().map_err(|_| ConnectError::invalid_parameter("Not a valid path"))?;
            if index & HARDENED != 0 {
                return Err(ConnectError::invalid_parameter("Not a valid path"));
            }
            Ok(if hardened { to_hardened(index) } else { index })
        })
        .collect()
}

/// Validates a caller supplied path and returns its indices.
///
/// The path must have at least `min_len` levels.
pub fn validate_path(path: &PathParam, min_len: usize) -> Result<Vec<u32>, ConnectError> {
    let indices = match path {
        PathParam::Serialized(path) => parse_path(path)?,
        PathParam::Indices(indices) => indices.clone(),
    };
    if indices.len() < min_len {
        return Err(ConnectError::invalid_parameter("Not a valid path"));
    }
    Ok(indices)
}

/// Serializes path indices as `m/44'/60'/0'/0/0`.
pub fn serialize_path(path: &[u32]) -> String {
    let mut out = String::from("m");
    for &index in path {
        out.push('/');
        out.push_str(&from_hardened(index).to_string());
        if index & HARDENED != 0 {
            out.push('\'');
        }
    }
    out
}
