use connect_common::{Device, DeviceModel, Transport};
use connect_ethereum::TypedData;
use connect_test_utils::{EmulatorOptions, FirmwareEmulator};

pub const ETH_PATH: &str = "m/44'/60'/0'/0/0";

/// The emulator's signer address, EIP-55 checksummed.
pub const SIGNER: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

pub fn typed_data(json: serde_json::Value) -> TypedData {
    TypedData::from_json(json).unwrap()
}

/// The signature returned by emulators with default options.
pub fn signature() -> String {
    format!("0x{}", "2c".repeat(65))
}

pub fn modern_device(options: EmulatorOptions) -> Device<FirmwareEmulator> {
    connect_test_utils::device(FirmwareEmulator::with_options(options), DeviceModel::T, "2.6.0")
}

pub fn legacy_device(options: EmulatorOptions) -> Device<FirmwareEmulator> {
    connect_test_utils::device(FirmwareEmulator::with_options(options), DeviceModel::One, "1.12.1")
}

pub fn model_t<T: Transport>(transport: T) -> Device<T> {
    connect_test_utils::device(transport, DeviceModel::T, "2.6.0")
}
