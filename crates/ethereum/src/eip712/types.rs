//! The typed data document and its type dictionary.

use super::TypedValue;
use connect_common::ConnectError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name of the domain struct, always present in a [`TypeDictionary`] built by ingestion.
pub const EIP712_DOMAIN: &str = "EIP712Domain";

/// One declared member of a struct type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub declared_type: String,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self { name: name.into(), declared_type: declared_type.into() }
    }
}

/// Struct definitions by name. Field order is declaration order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeDictionary(BTreeMap<String, Vec<FieldDescriptor>>);

impl TypeDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a struct definition, builder style.
    pub fn with(mut self, name: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        self.insert(name, fields);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, fields: Vec<FieldDescriptor>) {
        self.0.insert(name.into(), fields);
    }

    pub fn get(&self, name: &str) -> Option<&[FieldDescriptor]> {
        self.0.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[FieldDescriptor])> {
        self.0.iter().map(|(name, fields)| (name.as_str(), fields.as_slice()))
    }

    /// Inserts an empty `EIP712Domain` definition if there is none.
    pub fn ensure_domain(&mut self) {
        self.0.entry(EIP712_DOMAIN.to_string()).or_default();
    }
}

/// A typed data document: the types, the primary type, the domain and the message.
///
/// Deserializing keeps only these four keys and inserts an empty `EIP712Domain` definition when
/// the caller did not declare one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawTypedData")]
pub struct TypedData {
    pub types: TypeDictionary,
    pub primary_type: String,
    pub domain: TypedValue,
    pub message: TypedValue,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTypedData {
    types: TypeDictionary,
    primary_type: String,
    domain: TypedValue,
    message: TypedValue,
}

impl From<RawTypedData> for TypedData {
    fn from(raw: RawTypedData) -> Self {
        let RawTypedData { mut types, primary_type, domain, message } = raw;
        types.ensure_domain();
        Self { types, primary_type, domain, message }
    }
}

impl TypedData {
    pub fn new(
        types: TypeDictionary,
        primary_type: impl Into<String>,
        domain: TypedValue,
        message: TypedValue,
    ) -> Self {
        RawTypedData { types, primary_type: primary_type.into(), domain, message }.into()
    }

    /// Ingests a caller supplied JSON document.
    ///
    /// Missing or malformed keys are `Method_InvalidParameter` errors.
    pub fn from_json(data: serde_json::Value) -> Result<Self, ConnectError> {
        if !data.is_object() {
            return Err(ConnectError::invalid_parameter(
                "Parameter \"data\" has invalid type. \"object\" expected.",
            ));
        }
        serde_json::from_value(data).map_err(|err| {
            ConnectError::invalid_parameter(format!("Parameter \"data\" is invalid: {err}"))
        })
    }

    /// Returns the document with every arbitrary precision integer replaced by its decimal string.
    pub fn sanitize(self) -> Self {
        Self { domain: self.domain.sanitize(), message: self.message.sanitize(), ..self }
    }
}
