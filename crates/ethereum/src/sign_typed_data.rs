//! The `ethereumSignTypedData` method.
//!
//! Modern devices receive the document piece by piece: after the initial request the device asks
//! for struct definitions and then for individual values, addressed by member paths, until it
//! returns the signature. Legacy devices (model "1") cannot walk the document and sign the domain
//! separator and message hashes computed on the host instead.

use crate::{
    eip712::{
        HashVersion, TypeDictionary, TypeGraph, TypedData, TypedDataError,
        TypedDataHashes, encode_value, resolve_member, resolve_type,
    },
    network::{network_for_path, network_label, to_checksum_address},
};
use alloy_primitives::hex;
use connect_common::{
    ConnectError, Device, PathParam, Transport, TransportError, path::serialize_path,
    validate_path,
};
use connect_config::{ConnectConfig, EthereumNetwork, FirmwareRange};
use connect_protocol::{
    EncodedMessage, MessageType, ProtocolMessage,
    ethereum::{
        EthereumMessageSignature, EthereumSignTypedData as SignTypedDataRequest,
        EthereumSignTypedHash, EthereumStructMember, EthereumTypedDataSignature,
        EthereumTypedDataStructAck, EthereumTypedDataStructRequest, EthereumTypedDataValueAck,
        EthereumTypedDataValueRequest,
    },
};
use serde::{Deserialize, Serialize};

/// Responses accepted while struct definitions may still be requested.
const STRUCT_PHASE: &[MessageType] = &[
    MessageType::EthereumTypedDataStructRequest,
    MessageType::EthereumTypedDataValueRequest,
    MessageType::EthereumTypedDataSignature,
];

/// Responses accepted once the first value was sent.
const VALUE_PHASE: &[MessageType] =
    &[MessageType::EthereumTypedDataValueRequest, MessageType::EthereumTypedDataSignature];

/// Responses accepted after `EthereumSignTypedHash`.
const HASH_PHASE: &[MessageType] =
    &[MessageType::EthereumTypedDataSignature, MessageType::EthereumMessageSignature];

/// The signed typed data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTypedData {
    /// Checksummed signer address.
    pub address: String,
    /// `0x` prefixed signature.
    pub signature: String,
}

/// A device response during typed data signing.
#[derive(Debug)]
enum TypedDataResponse {
    StructRequest(EthereumTypedDataStructRequest),
    ValueRequest(EthereumTypedDataValueRequest),
    Signature(EthereumTypedDataSignature),
    LegacySignature(EthereumMessageSignature),
}

impl TypedDataResponse {
    fn decode(message: &EncodedMessage) -> Result<Self, TransportError> {
        Ok(match message.kind() {
            Some(MessageType::EthereumTypedDataStructRequest) => {
                Self::StructRequest(message.decode()?)
            }
            Some(MessageType::EthereumTypedDataValueRequest) => {
                Self::ValueRequest(message.decode()?)
            }
            Some(MessageType::EthereumTypedDataSignature) => Self::Signature(message.decode()?),
            Some(MessageType::EthereumMessageSignature) => Self::LegacySignature(message.decode()?),
            _ => {
                return Err(TransportError::UnexpectedMessage {
                    expected: HASH_PHASE.iter().chain(STRUCT_PHASE).copied().collect(),
                    got: message.to_string(),
                });
            }
        })
    }
}

/// Signs EIP-712 typed data.
#[derive(Clone, Debug)]
pub struct EthereumSignTypedData {
    path: Vec<u32>,
    network: Option<EthereumNetwork>,
    data: TypedData,
    metamask_v4_compat: bool,
    firmware_range: FirmwareRange,
    max_member_depth: usize,
    info: String,
}

impl EthereumSignTypedData {
    /// Validates the parameters.
    ///
    /// `path` must have at least three levels; its coin type selects the network.
    pub fn new(
        config: &ConnectConfig,
        path: impl Into<PathParam>,
        data: TypedData,
        metamask_v4_compat: bool,
    ) -> Result<Self, ConnectError> {
        let path = validate_path(&path.into(), 3)?;
        let network = network_for_path(config, &path).cloned();
        let info = network_label("Sign #NETWORK typed data", network.as_ref());
        Ok(Self {
            path,
            network,
            data,
            metamask_v4_compat,
            firmware_range: config.sign_typed_data_firmware.clone(),
            max_member_depth: config.typed_data.max_member_depth,
            info,
        })
    }

    /// Validates a JSON payload with `path`, `data` and `metamask_v4_compat`.
    pub fn from_payload(
        config: &ConnectConfig,
        payload: &serde_json::Value,
    ) -> Result<Self, ConnectError> {
        let param = |name: &str| {
            payload.get(name).filter(|value| !value.is_null()).ok_or_else(|| {
                ConnectError::invalid_parameter(format!("Parameter \"{name}\" is missing."))
            })
        };
        let invalid_type = |name: &str, expected: &str| {
            ConnectError::invalid_parameter(format!(
                "Parameter \"{name}\" has invalid type. \"{expected}\" expected."
            ))
        };

        let path: PathParam = serde_json::from_value(param("path")?.clone())
            .map_err(|_| invalid_type("path", "string|array"))?;
        let data = param("data")?;
        if !data.is_object() {
            return Err(invalid_type("data", "object"));
        }
        let data = TypedData::from_json(data.clone())?;
        let metamask_v4_compat = param("metamask_v4_compat")?
            .as_bool()
            .ok_or_else(|| invalid_type("metamask_v4_compat", "boolean"))?;

        Self::new(config, path, data, metamask_v4_compat)
    }

    /// Human readable description of the method, e.g. "Sign Ethereum typed data".
    pub fn info(&self) -> &str {
        &self.info
    }

    pub fn path(&self) -> &[u32] {
        &self.path
    }

    pub fn network(&self) -> Option<&EthereumNetwork> {
        self.network.as_ref()
    }

    /// Runs the signing session.
    ///
    /// The device is borrowed for the whole session. Any error ends it, nothing is retried.
    #[instrument(
        skip_all,
        fields(path = %serialize_path(&self.path), primary_type = %self.data.primary_type)
    )]
    pub async fn run<T: Transport>(
        &self,
        device: &mut Device<T>,
    ) -> Result<SignedTypedData, ConnectError> {
        device.check_firmware(&self.firmware_range)?;

        let data = self.data.clone().sanitize();
        TypeGraph::new(&data.types).validate_document(&data.primary_type)?;

        let mut response = if device.features().model.is_legacy() {
            let version = HashVersion::from_v4_compat(self.metamask_v4_compat);
            let hashes = TypedDataHashes::compute(&data, version)?;
            debug!(?version, ?hashes, "signing typed data hashes");
            let request = EthereumSignTypedHash {
                address_n: self.path.clone(),
                domain_separator_hash: hashes.domain_separator_hash.to_vec(),
                message_hash: Some(hashes.message_hash.to_vec()),
            };
            call(device, &request, HASH_PHASE).await?
        } else {
            let request = SignTypedDataRequest {
                address_n: self.path.clone(),
                primary_type: data.primary_type.clone(),
                metamask_v4_compat: Some(self.metamask_v4_compat),
            };
            call(device, &request, STRUCT_PHASE).await?
        };

        loop {
            response = match response {
                TypedDataResponse::StructRequest(request) => {
                    let ack = struct_ack(&data.types, &request.name)?;
                    debug!(name = %request.name, members = ack.members.len(), "struct request");
                    call(device, &ack, STRUCT_PHASE).await?
                }
                TypedDataResponse::ValueRequest(request) => {
                    let ack = self.value_ack(&data, &request.member_path)?;
                    debug!(path = ?request.member_path, len = ack.value.len(), "value request");
                    call(device, &ack, VALUE_PHASE).await?
                }
                TypedDataResponse::Signature(EthereumTypedDataSignature { address, signature })
                | TypedDataResponse::LegacySignature(EthereumMessageSignature {
                    address,
                    signature,
                }) => return self.finish(&address, &signature),
            };
        }
    }

    fn value_ack(
        &self,
        data: &TypedData,
        member_path: &[u32],
    ) -> Result<EthereumTypedDataValueAck, TypedDataError> {
        if member_path.len() > self.max_member_depth {
            return Err(TypedDataError::MemberPathTooDeep {
                path: member_path.to_vec(),
                max: self.max_member_depth,
            });
        }
        let member = resolve_member(
            member_path,
            &data.domain,
            &data.message,
            &data.primary_type,
            &data.types,
        )?;
        let value = member
            .value
            .ok_or_else(|| TypedDataError::MissingValue { path: member_path.to_vec() })?;
        let resolved = resolve_type(member.type_name, &data.types)?;
        trace!(path = ?member_path, ty = %resolved, "encoding value");
        Ok(EthereumTypedDataValueAck { value: encode_value(&resolved, value)? })
    }

    fn finish(&self, address: &str, signature: &[u8]) -> Result<SignedTypedData, ConnectError> {
        let address = to_checksum_address(address, self.network.as_ref())?;
        debug!(%address, "typed data signed");
        Ok(SignedTypedData { address, signature: hex::encode_prefixed(signature) })
    }
}

/// Lists the members of `name` in declaration order.
fn struct_ack(
    types: &TypeDictionary,
    name: &str,
) -> Result<EthereumTypedDataStructAck, TypedDataError> {
    let fields = types.get(name).ok_or_else(|| TypedDataError::TypeNotDefined(name.to_string()))?;
    let members = fields
        .iter()
        .map(|field| {
            let field_type = resolve_type(&field.declared_type, types)?.field_type(types)?;
            Ok(EthereumStructMember { field_type, name: field.name.clone() })
        })
        .collect::<Result<_, TypedDataError>>()?;
    Ok(EthereumTypedDataStructAck { members })
}

async fn call<T: Transport, M: ProtocolMessage>(
    device: &mut Device<T>,
    request: &M,
    expected: &[MessageType],
) -> Result<TypedDataResponse, ConnectError> {
    let response = device.typed_call(request, expected).await?;
    Ok(TypedDataResponse::decode(&response)?)
}

/// Signs `data` with the key at `path`, using the configuration from [`ConnectConfig::load`].
///
/// An invalid configuration fails with a `Runtime` error before the device is contacted. See
/// [`EthereumSignTypedData`].
pub async fn sign_typed_data<T: Transport>(
    device: &mut Device<T>,
    path: impl Into<PathParam>,
    data: TypedData,
    metamask_v4_compat: bool,
) -> Result<SignedTypedData, ConnectError> {
    let config = ConnectConfig::load().map_err(|err| ConnectError::runtime(err.to_string()))?;
    EthereumSignTypedData::new(&config, path, data, metamask_v4_compat)?.run(device).await
}
