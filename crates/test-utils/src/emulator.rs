//! A device side implementation of typed data signing.

use async_trait::async_trait;
use connect_common::{Transport, TransportError};
use connect_protocol::{
    EncodedMessage, MessageType, ProtocolMessage,
    common::{ButtonRequest, Failure, FailureType},
    ethereum::{
        EthereumDataType, EthereumFieldType, EthereumMessageSignature, EthereumSignTypedData,
        EthereumSignTypedHash, EthereumStructMember, EthereumTypedDataSignature,
        EthereumTypedDataStructAck, EthereumTypedDataStructRequest, EthereumTypedDataValueAck,
        EthereumTypedDataValueRequest,
    },
};
use std::collections::BTreeMap;

const DOMAIN: &str = "EIP712Domain";

/// Behaviour switches of the [`FirmwareEmulator`].
#[derive(Clone, Debug)]
pub struct EmulatorOptions {
    /// Address returned with the signature, as the device formats it.
    pub address: String,
    pub signature: Vec<u8>,
    /// Ask for a button press before returning the signature.
    pub confirm_with_button: bool,
    /// Answer `EthereumSignTypedHash` in the message signing shape, like older legacy firmware.
    pub legacy_signature_shape: bool,
}

impl Default for EmulatorOptions {
    fn default() -> Self {
        Self {
            address: "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed".to_string(),
            signature: vec![0x2c; 65],
            confirm_with_button: false,
            legacy_signature_shape: false,
        }
    }
}

/// A unit of work left to the emulated firmware.
#[derive(Clone, Debug)]
enum Task {
    /// Fetch a struct definition and, recursively, the structs it references.
    Collect(String),
    /// Request every member of a struct value.
    Struct { name: String, path: Vec<u32> },
    /// Request one member value. Arrays request their length first, unless fixed.
    Member { field: EthereumFieldType, path: Vec<u32> },
    /// Request `len` elements of an array.
    Elements { entry: EthereumFieldType, path: Vec<u32>, len: u32 },
    Button,
    Sign,
}

/// The request the emulator is waiting an answer for.
#[derive(Debug)]
enum Pending {
    Struct(String),
    ArrayLength { entry: EthereumFieldType, path: Vec<u32> },
    Value(Vec<u32>),
    Button,
}

/// Emulates the firmware's side of typed data signing.
///
/// The emulator drives the negotiation the way a device does: it requests the `EIP712Domain` and
/// primary type definitions with everything they reference, then walks the domain (root 0) and
/// the message (root 1) member by member, asking for array lengths before elements. Everything
/// it receives is recorded for inspection.
#[derive(Debug, Default)]
pub struct FirmwareEmulator {
    options: EmulatorOptions,
    tasks: Vec<Task>,
    pending: Option<Pending>,
    /// Struct definitions received, by name.
    pub structs: BTreeMap<String, Vec<EthereumStructMember>>,
    /// Struct requests in the order they were sent.
    pub struct_requests: Vec<String>,
    /// Value requests with the encoded values received, in order.
    pub values: Vec<(Vec<u32>, Vec<u8>)>,
    pub sign_request: Option<EthereumSignTypedData>,
    pub hash_request: Option<EthereumSignTypedHash>,
}

impl FirmwareEmulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: EmulatorOptions) -> Self {
        Self { options, ..Default::default() }
    }

    /// Returns the value received for `path`, if it was requested.
    pub fn value(&self, path: &[u32]) -> Option<&[u8]> {
        self.values.iter().find(|(p, _)| p == path).map(|(_, value)| value.as_slice())
    }

    /// Handles one incoming message and produces the response.
    fn handle(&mut self, message: &EncodedMessage) -> Result<EncodedMessage, String> {
        match (message.kind(), self.pending.take()) {
            (Some(MessageType::EthereumSignTypedData), None) => {
                let request: EthereumSignTypedData = decode(message)?;
                let primary = request.primary_type.clone();
                self.sign_request = Some(request);

                let mut tasks = vec![
                    Task::Collect(DOMAIN.to_string()),
                    Task::Collect(primary.clone()),
                    Task::Struct { name: DOMAIN.to_string(), path: vec![0] },
                ];
                if primary != DOMAIN {
                    tasks.push(Task::Struct { name: primary, path: vec![1] });
                }
                if self.options.confirm_with_button {
                    tasks.push(Task::Button);
                }
                tasks.push(Task::Sign);
                self.schedule(tasks);
            }
            (Some(MessageType::EthereumSignTypedHash), None) => {
                self.hash_request = Some(decode(message)?);
                if self.options.confirm_with_button {
                    self.schedule(vec![Task::Button, Task::Sign]);
                } else {
                    self.schedule(vec![Task::Sign]);
                }
            }
            (Some(MessageType::EthereumTypedDataStructAck), Some(Pending::Struct(name))) => {
                let ack: EthereumTypedDataStructAck = decode(message)?;
                let referenced = ack
                    .members
                    .iter()
                    .filter_map(|member| innermost_struct(&member.field_type))
                    .map(|name| Task::Collect(name.to_string()))
                    .collect();
                self.structs.insert(name, ack.members);
                self.schedule(referenced);
            }
            (
                Some(MessageType::EthereumTypedDataValueAck),
                Some(Pending::ArrayLength { entry, path }),
            ) => {
                let ack: EthereumTypedDataValueAck = decode(message)?;
                let len: [u8; 2] = ack
                    .value
                    .as_slice()
                    .try_into()
                    .map_err(|_| format!("array length at {path:?} is not a uint16"))?;
                self.values.push((path.clone(), ack.value));
                let len = u32::from(u16::from_be_bytes(len));
                self.schedule(vec![Task::Elements { entry, path, len }]);
            }
            (Some(MessageType::EthereumTypedDataValueAck), Some(Pending::Value(path))) => {
                let ack: EthereumTypedDataValueAck = decode(message)?;
                self.values.push((path, ack.value));
            }
            (Some(MessageType::ButtonAck), Some(Pending::Button)) => {}
            (_, pending) => {
                return Err(format!("unexpected {message} while waiting for {pending:?}"));
            }
        }
        self.advance()
    }

    /// Pushes `tasks` so that they run next, in order.
    fn schedule(&mut self, tasks: Vec<Task>) {
        self.tasks.extend(tasks.into_iter().rev());
    }

    /// Runs tasks until one of them needs to talk to the host.
    fn advance(&mut self) -> Result<EncodedMessage, String> {
        while let Some(task) = self.tasks.pop() {
            match task {
                Task::Collect(name) => {
                    if self.structs.contains_key(&name) || self.struct_requests.contains(&name) {
                        continue;
                    }
                    self.struct_requests.push(name.clone());
                    self.pending = Some(Pending::Struct(name.clone()));
                    return Ok(EthereumTypedDataStructRequest { name }.to_encoded());
                }
                Task::Struct { name, path } => {
                    let members = self
                        .structs
                        .get(&name)
                        .ok_or_else(|| format!("struct {name} was never defined"))?;
                    let tasks = members
                        .iter()
                        .zip(0u32..)
                        .map(|(member, index)| Task::Member {
                            field: member.field_type.clone(),
                            path: child(&path, index),
                        })
                        .collect();
                    self.schedule(tasks);
                }
                Task::Member { field, path } => match field.data_type() {
                    EthereumDataType::Struct => {
                        let name = field.struct_name.ok_or("struct member without a name")?;
                        self.schedule(vec![Task::Struct { name, path }]);
                    }
                    EthereumDataType::Array => {
                        let entry = *field.entry_type.ok_or("array member without entry type")?;
                        if let Some(len) = field.size {
                            self.schedule(vec![Task::Elements { entry, path, len }]);
                        } else {
                            self.pending = Some(Pending::ArrayLength { entry, path: path.clone() });
                            let request = EthereumTypedDataValueRequest { member_path: path };
                            return Ok(request.to_encoded());
                        }
                    }
                    _ => {
                        self.pending = Some(Pending::Value(path.clone()));
                        return Ok(EthereumTypedDataValueRequest { member_path: path }.to_encoded());
                    }
                },
                Task::Elements { entry, path, len } => {
                    let tasks = (0..len)
                        .map(|index| Task::Member {
                            field: entry.clone(),
                            path: child(&path, index),
                        })
                        .collect();
                    self.schedule(tasks);
                }
                Task::Button => {
                    self.pending = Some(Pending::Button);
                    return Ok(ButtonRequest { code: Some(1), pages: None }.to_encoded());
                }
                Task::Sign => {
                    let EmulatorOptions { address, signature, .. } = self.options.clone();
                    if self.hash_request.is_some() && self.options.legacy_signature_shape {
                        return Ok(EthereumMessageSignature { signature, address }.to_encoded());
                    }
                    return Ok(EthereumTypedDataSignature { signature, address }.to_encoded());
                }
            }
        }
        Err("nothing left to do".to_string())
    }
}

#[async_trait]
impl Transport for FirmwareEmulator {
    async fn call(&mut self, message: EncodedMessage) -> Result<EncodedMessage, TransportError> {
        let response = self.handle(&message).unwrap_or_else(|reason| {
            debug!(%reason, "emulated firmware failure");
            self.tasks.clear();
            Failure { code: Some(FailureType::UnexpectedMessage as i32), message: Some(reason) }
                .to_encoded()
        });
        trace!(%message, %response, "emulated exchange");
        Ok(response)
    }
}

fn decode<M: ProtocolMessage>(message: &EncodedMessage) -> Result<M, String> {
    message.decode().map_err(|err| err.to_string())
}

fn child(path: &[u32], index: u32) -> Vec<u32> {
    let mut child = path.to_vec();
    child.push(index);
    child
}

fn innermost_struct(field: &EthereumFieldType) -> Option<&str> {
    match field.data_type() {
        EthereumDataType::Struct => field.struct_name.as_deref(),
        EthereumDataType::Array => field.entry_type.as_deref().and_then(innermost_struct),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(data_type: EthereumDataType, size: Option<u32>) -> EthereumFieldType {
        EthereumFieldType { data_type: data_type as i32, size, entry_type: None, struct_name: None }
    }

    fn member(name: &str, field_type: EthereumFieldType) -> EthereumStructMember {
        EthereumStructMember { name: name.to_string(), field_type }
    }

    async fn exchange<M: ProtocolMessage>(
        emulator: &mut FirmwareEmulator,
        message: M,
    ) -> EncodedMessage {
        emulator.call(message.to_encoded()).await.unwrap()
    }

    fn value_request(path: &[u32]) -> EncodedMessage {
        EthereumTypedDataValueRequest { member_path: path.to_vec() }.to_encoded()
    }

    #[tokio::test]
    async fn walks_structs_then_values() {
        let mut emulator = FirmwareEmulator::new();
        let request = EthereumSignTypedData {
            address_n: vec![],
            primary_type: "Person".into(),
            metamask_v4_compat: Some(true),
        };

        let response = exchange(&mut emulator, request).await;
        assert_eq!(response, EthereumTypedDataStructRequest { name: DOMAIN.into() }.to_encoded());

        let response =
            exchange(&mut emulator, EthereumTypedDataStructAck { members: vec![] }).await;
        assert_eq!(response, EthereumTypedDataStructRequest { name: "Person".into() }.to_encoded());

        let mut wallets = field(EthereumDataType::Array, None);
        wallets.entry_type = Some(Box::new(field(EthereumDataType::Address, None)));
        let ack = EthereumTypedDataStructAck { members: vec![member("wallets", wallets)] };
        let response = exchange(&mut emulator, ack).await;
        assert_eq!(response, value_request(&[1, 0]));

        let response =
            exchange(&mut emulator, EthereumTypedDataValueAck { value: vec![0, 2] }).await;
        assert_eq!(response, value_request(&[1, 0, 0]));
        let response =
            exchange(&mut emulator, EthereumTypedDataValueAck { value: vec![1; 20] }).await;
        assert_eq!(response, value_request(&[1, 0, 1]));
        let response =
            exchange(&mut emulator, EthereumTypedDataValueAck { value: vec![2; 20] }).await;
        assert_eq!(response.kind(), Some(MessageType::EthereumTypedDataSignature));

        assert_eq!(emulator.struct_requests, [DOMAIN, "Person"]);
        assert_eq!(emulator.value(&[1, 0]), Some(&[0, 2][..]));
        assert_eq!(emulator.value(&[1, 0, 1]), Some(&[2; 20][..]));
    }

    #[tokio::test]
    async fn fixed_arrays_skip_the_length() {
        let mut emulator = FirmwareEmulator::new();
        let request = EthereumSignTypedData {
            address_n: vec![],
            primary_type: DOMAIN.into(),
            metamask_v4_compat: Some(true),
        };
        exchange(&mut emulator, request).await;

        let mut pair = field(EthereumDataType::Array, Some(2));
        pair.entry_type = Some(Box::new(field(EthereumDataType::Uint, Some(1))));
        let ack = EthereumTypedDataStructAck { members: vec![member("pair", pair)] };
        let response = exchange(&mut emulator, ack).await;
        assert_eq!(response, value_request(&[0, 0, 0]));
    }

    #[tokio::test]
    async fn answers_unexpected_messages_with_failure() {
        let mut emulator = FirmwareEmulator::new();
        let response = exchange(&mut emulator, EthereumTypedDataValueAck { value: vec![] }).await;
        let failure = response.decode::<Failure>().unwrap();
        assert_eq!(failure.failure_type(), Some(FailureType::UnexpectedMessage));
    }

    #[tokio::test]
    async fn signs_hashes() {
        let options = EmulatorOptions { legacy_signature_shape: true, ..Default::default() };
        let mut emulator = FirmwareEmulator::with_options(options);
        let request = EthereumSignTypedHash {
            address_n: vec![],
            domain_separator_hash: vec![0; 32],
            message_hash: None,
        };
        let response = exchange(&mut emulator, request).await;
        assert_eq!(response.kind(), Some(MessageType::EthereumMessageSignature));
        assert!(emulator.hash_request.is_some());
    }
}
