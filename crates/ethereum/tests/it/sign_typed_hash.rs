use crate::utils::*;
use alloy_primitives::b256;
use connect_common::DeviceModel;
use connect_ethereum::sign_typed_data;
use connect_test_utils::{EmulatorOptions, ScriptedTransport, fixtures, init_tracing};
use serde_json::json;
use similar_asserts::assert_eq;

#[tokio::test]
async fn signs_hashes_on_legacy_devices() {
    init_tracing();
    for metamask_v4_compat in [true, false] {
        let mut device = legacy_device(EmulatorOptions::default());
        let data = typed_data(fixtures::ether_mail());

        let signed =
            sign_typed_data(&mut device, ETH_PATH, data, metamask_v4_compat).await.unwrap();
        assert_eq!(signed.address, SIGNER);
        assert_eq!(signed.signature, signature());

        let emulator = device.into_transport();
        assert!(emulator.sign_request.is_none());
        assert!(emulator.struct_requests.is_empty());
        let request = emulator.hash_request.unwrap();
        assert_eq!(
            request.domain_separator_hash,
            b256!("0xf2cee375fa42b42143804025fc449deafd50cc031ca257e0b194a650a912090f").to_vec()
        );
        assert_eq!(
            request.message_hash,
            Some(
                b256!("0xc52c0ee5d84264471806290a3f2c4cecfc5490626bf912d01f240d7a274b371e")
                    .to_vec(),
            )
        );
    }
}

#[tokio::test]
async fn accepts_message_signature_responses() {
    init_tracing();
    let options = EmulatorOptions {
        legacy_signature_shape: true,
        confirm_with_button: true,
        ..Default::default()
    };
    let mut device = legacy_device(options);
    let data = typed_data(fixtures::ether_mail());

    let signed = sign_typed_data(&mut device, ETH_PATH, data, true).await.unwrap();
    assert_eq!(signed.address, SIGNER);
    assert_eq!(signed.signature, signature());
}

#[tokio::test]
async fn hashes_domain_only_data_as_the_message_too() {
    init_tracing();
    let mut json = fixtures::ether_mail();
    json["primaryType"] = json!("EIP712Domain");
    json["message"] = json["domain"].clone();
    let mut device = legacy_device(EmulatorOptions::default());

    sign_typed_data(&mut device, ETH_PATH, typed_data(json), true).await.unwrap();

    let request = device.into_transport().hash_request.unwrap();
    let domain_hash =
        b256!("0xf2cee375fa42b42143804025fc449deafd50cc031ca257e0b194a650a912090f").to_vec();
    assert_eq!(request.domain_separator_hash, domain_hash);
    assert_eq!(request.message_hash, Some(domain_hash));
}

#[tokio::test]
async fn arrays_need_v4_hashing() {
    init_tracing();
    let mut device =
        connect_test_utils::device(ScriptedTransport::new(), DeviceModel::One, "1.12.1");
    let data = typed_data(fixtures::uint_array());

    let err = sign_typed_data(&mut device, ETH_PATH, data, false).await.unwrap_err();
    assert_eq!(err.code(), "Runtime");
    assert_eq!(err.to_string(), "Arrays are unimplemented in encodeData; use V4 extension");
    assert!(device.transport().requests().is_empty());

    // V4 hashes them
    let mut device = legacy_device(EmulatorOptions::default());
    let data = typed_data(fixtures::uint_array());
    sign_typed_data(&mut device, ETH_PATH, data, true).await.unwrap();
    assert!(device.into_transport().hash_request.unwrap().message_hash.is_some());
}

#[tokio::test]
async fn refuses_old_legacy_firmware() {
    init_tracing();
    let mut device =
        connect_test_utils::device(ScriptedTransport::new(), DeviceModel::One, "1.10.4");
    let data = typed_data(fixtures::ether_mail());

    let err = sign_typed_data(&mut device, ETH_PATH, data, true).await.unwrap_err();
    assert_eq!(err.code(), "Method_NotAllowed");
    assert!(device.transport().requests().is_empty());

    let mut device =
        connect_test_utils::device(ScriptedTransport::new(), DeviceModel::One, "1.10.5");
    let data = typed_data(fixtures::ether_mail());
    let err = sign_typed_data(&mut device, ETH_PATH, data, true).await.unwrap_err();
    assert_eq!(err.code(), "Device_Disconnected");
}
