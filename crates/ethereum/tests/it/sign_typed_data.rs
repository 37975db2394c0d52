use crate::utils::*;
use alloy_primitives::{U256, hex};
use connect_common::{ConnectError, ErrorKind, HARDENED, TransportError};
use connect_config::ConnectConfig;
use connect_ethereum::{
    EthereumSignTypedData, SignedTypedData, TypedValue, eip712::Numeric, sign_typed_data,
};
use connect_protocol::{
    common::{Failure, FailureType},
    ethereum::{EthereumTypedDataStructRequest, EthereumTypedDataValueRequest},
};
use connect_test_utils::{EmulatorOptions, ScriptedTransport, fixtures, init_tracing};
use serde_json::json;
use similar_asserts::assert_eq;

#[tokio::test]
async fn signs_person_wallet() {
    init_tracing();
    let mut device = modern_device(EmulatorOptions::default());
    let data = typed_data(fixtures::person_wallet());

    let signed = sign_typed_data(&mut device, ETH_PATH, data, true).await.unwrap();
    assert_eq!(signed, SignedTypedData { address: SIGNER.to_string(), signature: signature() });

    let emulator = device.into_transport();
    let request = emulator.sign_request.as_ref().unwrap();
    assert_eq!(request.primary_type, "Person");
    assert_eq!(request.address_n, [HARDENED | 44, HARDENED | 60, HARDENED, 0, 0]);
    assert_eq!(request.metamask_v4_compat, Some(true));

    assert_eq!(emulator.struct_requests, ["EIP712Domain", "Person"]);
    let person = &emulator.structs["Person"];
    assert_eq!(person.len(), 1);
    assert_eq!(person[0].name, "wallet");

    assert_eq!(emulator.value(&[0, 0]), Some(&b"Test"[..]));
    let wallet = hex::decode(fixtures::WALLET).unwrap();
    assert_eq!(emulator.value(&[1, 0]), Some(wallet.as_slice()));
    assert_eq!(emulator.values.len(), 2);
}

#[tokio::test]
async fn sends_array_length_before_elements() {
    init_tracing();
    let mut device = modern_device(EmulatorOptions::default());
    let data = typed_data(fixtures::uint_array());
    let values = data.message.as_object().unwrap()["values"].as_array().unwrap();
    assert!(matches!(&values[1], TypedValue::Number(Numeric::Big(_))), "{values:?}");

    sign_typed_data(&mut device, ETH_PATH, data, true).await.unwrap();

    let emulator = device.into_transport();
    assert_eq!(emulator.value(&[1, 0]), Some(&[0, 3][..]));

    let elements: Vec<_> =
        emulator.values.iter().filter(|(path, _)| path.len() == 3 && path[..2] == [1, 0]).collect();
    assert_eq!(elements.len(), 3);

    let one = U256::from(1).to_be_bytes::<32>();
    let max = U256::MAX.to_be_bytes::<32>();
    let three = U256::from(3).to_be_bytes::<32>();
    assert_eq!(emulator.value(&[1, 0, 0]), Some(&one[..]));
    assert_eq!(emulator.value(&[1, 0, 1]), Some(&max[..]));
    assert_eq!(emulator.value(&[1, 0, 2]), Some(&three[..]));
}

#[tokio::test]
async fn walks_nested_and_fixed_arrays() {
    init_tracing();
    let mut device = modern_device(EmulatorOptions::default());
    let data = typed_data(fixtures::group_mail());

    sign_typed_data(&mut device, ETH_PATH, data, true).await.unwrap();

    let emulator = device.into_transport();
    assert_eq!(emulator.struct_requests, ["EIP712Domain", "Mail", "Person"]);

    // to: Person[]
    assert_eq!(emulator.value(&[1, 1]), Some(&[0, 2][..]));
    assert_eq!(emulator.value(&[1, 1, 0, 0]), Some(&b"Bob"[..]));
    assert_eq!(emulator.value(&[1, 1, 0, 1]), Some(&[0, 0][..]));
    assert_eq!(emulator.value(&[1, 1, 1, 1]), Some(&[0, 2][..]));
    let dan = hex!("B0B0b0b0b0b0B000000000000000000000000000");
    assert_eq!(emulator.value(&[1, 1, 1, 1, 1]), Some(&dan[..]));

    // tags: bytes4[2], the length is never requested
    assert_eq!(emulator.value(&[1, 2]), None);
    assert_eq!(emulator.value(&[1, 2, 0]), Some(&[1, 2, 3, 4][..]));
    assert_eq!(emulator.value(&[1, 2, 1]), Some(&[0xde, 0xad, 0xbe, 0xef][..]));

    // grid: int8[][]
    assert_eq!(emulator.value(&[1, 3]), Some(&[0, 3][..]));
    assert_eq!(emulator.value(&[1, 3, 0]), Some(&[0, 2][..]));
    assert_eq!(emulator.value(&[1, 3, 0, 0]), Some(&[0xff][..]));
    assert_eq!(emulator.value(&[1, 3, 1]), Some(&[0, 0][..]));
    assert_eq!(emulator.value(&[1, 3, 2, 0]), Some(&[0x7f][..]));

    assert_eq!(emulator.values.len(), 21);
}

#[tokio::test]
async fn acknowledges_button_requests() {
    init_tracing();
    let options = EmulatorOptions { confirm_with_button: true, ..Default::default() };
    let mut device = modern_device(options);
    let data = typed_data(fixtures::ether_mail());

    let signed = sign_typed_data(&mut device, ETH_PATH, data, true).await.unwrap();
    assert_eq!(signed.signature, signature());
}

#[tokio::test]
async fn formats_address_for_network() {
    init_tracing();
    let mut device = modern_device(EmulatorOptions::default());
    let data = typed_data(fixtures::ether_mail());

    // RSK uses the chain id checksum
    let signed = sign_typed_data(&mut device, "m/44'/137'/0'/0/0", data, true).await.unwrap();
    assert_eq!(signed.address, "0x5aaEB6053f3e94c9b9a09f33669435E7ef1bEAeD");
}

#[tokio::test]
async fn runs_from_payload() {
    init_tracing();
    let config = ConnectConfig::default();
    let payload = json!({
        "path": [HARDENED | 44, HARDENED | 60, HARDENED, 0, 0],
        "data": fixtures::ether_mail(),
        "metamask_v4_compat": true,
    });
    let method = EthereumSignTypedData::from_payload(&config, &payload).unwrap();
    assert_eq!(method.info(), "Sign Ethereum typed data");

    let mut device = modern_device(EmulatorOptions::default());
    let signed = method.run(&mut device).await.unwrap();
    assert_eq!(signed.address, SIGNER);

    let emulator = device.into_transport();
    assert_eq!(emulator.struct_requests, ["EIP712Domain", "Mail", "Person"]);
    assert_eq!(emulator.value(&[1, 1, 0]), Some(&b"Bob"[..]));
    assert_eq!(emulator.value(&[1, 2]), Some(&b"Hello, Bob!"[..]));
}

#[tokio::test]
async fn missing_values_end_the_session() {
    init_tracing();
    let mut device = modern_device(EmulatorOptions::default());
    let mut json = fixtures::person_wallet();
    json["message"] = json!({});

    let err = sign_typed_data(&mut device, ETH_PATH, typed_data(json), true).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Runtime);
    assert_eq!(err.to_string(), "No value for member path [1, 0]");
}

#[tokio::test]
async fn missing_types_fail_before_any_exchange() {
    init_tracing();
    let mut device = model_t(ScriptedTransport::new());
    let data = typed_data(fixtures::missing_type());

    let err = sign_typed_data(&mut device, ETH_PATH, data, true).await.unwrap_err();
    assert_eq!(err.code(), "Runtime");
    assert_eq!(err.to_string(), "Type Trader was not defined in types object");
    assert!(device.transport().requests().is_empty());
}

#[tokio::test]
async fn refuses_old_firmware() {
    init_tracing();
    let mut device = connect_test_utils::device(
        ScriptedTransport::new(),
        connect_common::DeviceModel::T,
        "2.4.2",
    );
    let data = typed_data(fixtures::person_wallet());

    let err = sign_typed_data(&mut device, ETH_PATH, data, true).await.unwrap_err();
    assert_eq!(err.code(), "Method_NotAllowed");
    assert!(device.transport().requests().is_empty());
}

#[tokio::test]
async fn rejects_struct_requests_after_values() {
    init_tracing();
    let transport = ScriptedTransport::new()
        .respond(EthereumTypedDataValueRequest { member_path: vec![0, 0] })
        .respond(EthereumTypedDataStructRequest { name: "Person".into() });
    let mut device = model_t(transport);
    let data = typed_data(fixtures::person_wallet());

    let err = sign_typed_data(&mut device, ETH_PATH, data, true).await.unwrap_err();
    assert!(matches!(err, ConnectError::Transport(TransportError::UnexpectedMessage { .. })));
    assert_eq!(err.code(), "Runtime");
    assert_eq!(device.transport().requests().len(), 2);
}

#[tokio::test]
async fn rejects_unknown_struct_and_root() {
    init_tracing();
    let transport =
        ScriptedTransport::new().respond(EthereumTypedDataStructRequest { name: "Ghost".into() });
    let mut device = model_t(transport);
    let err = sign_typed_data(&mut device, ETH_PATH, typed_data(fixtures::person_wallet()), true)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Type Ghost was not defined in types object");

    let transport =
        ScriptedTransport::new().respond(EthereumTypedDataValueRequest { member_path: vec![2, 0] });
    let mut device = model_t(transport);
    let err = sign_typed_data(&mut device, ETH_PATH, typed_data(fixtures::person_wallet()), true)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Root index can only be 0 or 1, got 2");
}

#[tokio::test]
async fn propagates_device_errors() {
    init_tracing();
    let transport = ScriptedTransport::new()
        .respond(EthereumTypedDataStructRequest { name: "EIP712Domain".into() })
        .respond(Failure {
            code: Some(FailureType::ActionCancelled as i32),
            message: Some("Cancelled".into()),
        });
    let mut device = model_t(transport);
    let err = sign_typed_data(&mut device, ETH_PATH, typed_data(fixtures::person_wallet()), true)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "Failure_ActionCancelled");
    assert_eq!(err.to_string(), "Cancelled");

    let cases = [
        (TransportError::Cancelled, "Method_Cancel"),
        (TransportError::Disconnected, "Device_Disconnected"),
        (TransportError::Failure { code: None, message: None }, "Failure_Unknown"),
    ];
    for (error, code) in cases {
        let mut device = model_t(ScriptedTransport::new().fail(error));
        let data = typed_data(fixtures::person_wallet());
        let err = sign_typed_data(&mut device, ETH_PATH, data, true).await.unwrap_err();
        assert_eq!(err.code(), code);
        assert_eq!(device.transport().requests().len(), 1);
    }
}
