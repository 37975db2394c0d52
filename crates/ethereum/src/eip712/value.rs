//! The typed data value tree.

use super::TypedDataError;
use alloy_primitives::{I256, U256, hex};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, str::FromStr};

/// An integer as it was supplied by the caller.
///
/// The variant is decided once, when the value is ingested.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Numeric {
    /// Fits a native 64-bit integer, signed or unsigned.
    Fixed(i128),
    /// Arbitrary precision, kept as exact decimal digits with an optional leading `-`.
    Big(String),
}

impl Numeric {
    /// Parses an integer literal, choosing the variant by magnitude.
    pub fn parse(literal: &str) -> Result<Self, TypedDataError> {
        let digits = literal.strip_prefix('-').unwrap_or(literal);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TypedDataError::NonIntegerNumber(literal.to_string()));
        }
        if let Ok(n) = literal.parse::<u64>() {
            return Ok(Self::Fixed(n.into()));
        }
        if let Ok(n) = literal.parse::<i64>() {
            return Ok(Self::Fixed(n.into()));
        }
        Ok(Self::Big(literal.to_string()))
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Self::Fixed(n) => *n == 0,
            Self::Big(digits) => digits.trim_start_matches('-').bytes().all(|b| b == b'0'),
        }
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(n) => n.fmt(f),
            Self::Big(digits) => f.write_str(digits),
        }
    }
}

/// A domain or message value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "serde_json::Value", into = "serde_json::Value")]
pub enum TypedValue {
    Null,
    Bool(bool),
    Number(Numeric),
    String(String),
    Bytes(Vec<u8>),
    Array(Vec<TypedValue>),
    Object(BTreeMap<String, TypedValue>),
}

impl TypedValue {
    pub fn as_array(&self) -> Option<&[Self]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, Self>> {
        match self {
            Self::Object(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(bytes.into())
    }

    /// Replaces every arbitrary precision integer with its exact decimal string.
    ///
    /// Shapes and all other leaves are left in place.
    pub fn sanitize(self) -> Self {
        match self {
            Self::Number(Numeric::Big(digits)) => Self::String(digits),
            Self::Array(items) => Self::Array(items.into_iter().map(Self::sanitize).collect()),
            Self::Object(fields) => {
                Self::Object(fields.into_iter().map(|(k, v)| (k, v.sanitize())).collect())
            }
            other => other,
        }
    }

    /// Converts the value to JSON, rendering bytes as `0x` prefixed hex.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => (*b).into(),
            Self::Number(Numeric::Fixed(n)) => match u64::try_from(*n) {
                Ok(n) => n.into(),
                // Fixed never exceeds the i64 range when negative
                Err(_) => i64::try_from(*n).map_or_else(|_| n.to_string().into(), Into::into),
            },
            Self::Number(Numeric::Big(digits)) => serde_json::Number::from_str(digits)
                .map_or_else(|_| digits.clone().into(), serde_json::Value::Number),
            Self::String(s) => s.clone().into(),
            Self::Bytes(bytes) => hex::encode_prefixed(bytes).into(),
            Self::Array(items) => items.iter().map(Self::to_json).collect(),
            Self::Object(fields) => {
                fields.iter().map(|(k, v)| (k.clone(), v.to_json())).collect()
            }
        }
    }
}

impl TryFrom<serde_json::Value> for TypedValue {
    type Error = TypedDataError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        Ok(match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(Numeric::parse(&n.to_string())?),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::Array(items.into_iter().map(Self::try_from).collect::<Result<_, _>>()?)
            }
            serde_json::Value::Object(fields) => Self::Object(
                fields
                    .into_iter()
                    .map(|(k, v)| Ok((k, Self::try_from(v)?)))
                    .collect::<Result<_, TypedDataError>>()?,
            ),
        })
    }
}

impl From<TypedValue> for serde_json::Value {
    fn from(value: TypedValue) -> Self {
        value.to_json()
    }
}

impl From<bool> for TypedValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for TypedValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for TypedValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<u64> for TypedValue {
    fn from(n: u64) -> Self {
        Self::Number(Numeric::Fixed(n.into()))
    }
}

impl From<i64> for TypedValue {
    fn from(n: i64) -> Self {
        Self::Number(Numeric::Fixed(n.into()))
    }
}

impl From<U256> for TypedValue {
    fn from(n: U256) -> Self {
        match u64::try_from(n) {
            Ok(n) => n.into(),
            Err(_) => Self::Number(Numeric::Big(n.to_string())),
        }
    }
}

impl From<I256> for TypedValue {
    fn from(n: I256) -> Self {
        match i64::try_from(n) {
            Ok(n) => n.into(),
            Err(_) => Self::Number(Numeric::Big(n.to_string())),
        }
    }
}

impl<T: Into<Self>> From<Vec<T>> for TypedValue {
    fn from(items: Vec<T>) -> Self {
        Self::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<K: Into<String>, V: Into<Self>> FromIterator<(K, V)> for TypedValue {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::Object(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_variant_is_decided_by_magnitude() {
        assert_eq!(Numeric::parse("42").unwrap(), Numeric::Fixed(42));
        assert_eq!(Numeric::parse("-42").unwrap(), Numeric::Fixed(-42));
        assert_eq!(
            Numeric::parse("18446744073709551615").unwrap(),
            Numeric::Fixed(u64::MAX.into())
        );
        assert_eq!(
            Numeric::parse("18446744073709551616").unwrap(),
            Numeric::Big("18446744073709551616".into())
        );
        assert_eq!(
            Numeric::parse("-9223372036854775809").unwrap(),
            Numeric::Big("-9223372036854775809".into())
        );
        assert!(matches!(Numeric::parse("1.5"), Err(TypedDataError::NonIntegerNumber(_))));
        assert!(matches!(Numeric::parse("1e3"), Err(TypedDataError::NonIntegerNumber(_))));
        assert!(matches!(Numeric::parse("-"), Err(TypedDataError::NonIntegerNumber(_))));
    }

    #[test]
    fn ingests_json() {
        let value: TypedValue = serde_json::from_value(json!({
            "amount": 1000,
            "flags": [true, null],
            "name": "Cow",
        }))
        .unwrap();
        let fields = value.as_object().unwrap();
        assert_eq!(fields["amount"], TypedValue::Number(Numeric::Fixed(1000)));
        assert_eq!(
            fields["flags"],
            TypedValue::Array(vec![TypedValue::Bool(true), TypedValue::Null])
        );
        assert_eq!(fields["name"], TypedValue::from("Cow"));
    }

    #[test]
    fn ingests_big_literals_exactly() {
        let max = "115792089237316195423570985008687907853269984665640564039457584007913129639935";
        let value: TypedValue = serde_json::from_str(&format!(r#"{{"v":[{max}, -1]}}"#)).unwrap();
        let items = value.as_object().unwrap()["v"].as_array().unwrap();
        assert_eq!(items[0], TypedValue::Number(Numeric::Big(max.to_string())));
        assert_eq!(items[1], TypedValue::Number(Numeric::Fixed(-1)));

        let err = serde_json::from_str::<TypedValue>("[1.25]").unwrap_err();
        assert!(err.to_string().contains("only integers are supported"), "{err}");
    }

    #[test]
    fn sanitize_only_touches_big_integers() {
        let big = U256::MAX;
        let value: TypedValue = [
            ("big", TypedValue::from(big)),
            ("small", TypedValue::from(7u64)),
            ("flag", TypedValue::from(false)),
            ("nested", TypedValue::from(vec![TypedValue::from(I256::MIN), TypedValue::from("x")])),
        ]
        .into_iter()
        .collect();

        let sanitized = value.clone().sanitize();
        let fields = sanitized.as_object().unwrap();
        assert_eq!(fields["big"], TypedValue::String(big.to_string()));
        assert_eq!(fields["small"], TypedValue::from(7u64));
        assert_eq!(fields["flag"], TypedValue::Bool(false));
        assert_eq!(
            fields["nested"],
            TypedValue::Array(vec![
                TypedValue::String(I256::MIN.to_string()),
                TypedValue::from("x"),
            ])
        );
        assert_eq!(value.as_object().unwrap().len(), fields.len());
    }

    #[test]
    fn json_rendering() {
        let value: TypedValue = [
            ("data", TypedValue::bytes([0xde, 0xad])),
            ("neg", TypedValue::from(-5i64)),
            ("big", TypedValue::from(U256::MAX)),
        ]
        .into_iter()
        .collect();
        let json = value.to_json();
        assert_eq!(json["data"], "0xdead");
        assert_eq!(json["neg"], -5);
        assert_eq!(json["big"].to_string(), U256::MAX.to_string());
    }
}
