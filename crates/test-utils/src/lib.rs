//! Utilities for testing device methods without a device.

#![warn(unused_crate_dependencies, unreachable_pub)]
#![allow(clippy::disallowed_macros)]

#[macro_use]
extern crate tracing;

mod emulator;
pub use emulator::{EmulatorOptions, FirmwareEmulator};

pub mod fixtures;

mod scripted;
pub use scripted::ScriptedTransport;

use connect_common::{Device, DeviceModel, Features, Transport};

/// Initializes tracing for tests.
pub fn init_tracing() {
    let _ = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Wraps `transport` in a device of the given model and firmware version.
///
/// # Panics
///
/// If `firmware` is not a valid semver version.
pub fn device<T: Transport>(transport: T, model: DeviceModel, firmware: &str) -> Device<T> {
    let firmware = semver::Version::parse(firmware).expect("invalid firmware version");
    Device::new(transport, Features::new(model, firmware))
}
