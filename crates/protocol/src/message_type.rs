/// Wire ids of the messages this crate knows about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::FromRepr)]
#[repr(u16)]
pub enum MessageType {
    Failure = 3,
    ButtonRequest = 26,
    ButtonAck = 27,
    EthereumMessageSignature = 66,
    EthereumSignTypedData = 464,
    EthereumTypedDataStructRequest = 465,
    EthereumTypedDataStructAck = 466,
    EthereumTypedDataValueRequest = 467,
    EthereumTypedDataValueAck = 468,
    EthereumTypedDataSignature = 469,
    EthereumSignTypedHash = 470,
}
