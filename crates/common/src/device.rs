//! Device handle, features and capability checks.

use crate::{ConnectError, Transport, TransportError};
use connect_config::{FirmwareBounds, FirmwareRange};
use connect_protocol::{
    EncodedMessage, MessageType, ProtocolMessage,
    common::{ButtonAck, ButtonRequest, Failure},
};
use semver::Version;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Device model as reported in the features.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceModel {
    #[serde(rename = "1")]
    One,
    #[serde(rename = "T")]
    T,
    #[serde(rename = "Safe 3")]
    Safe3,
    #[serde(rename = "Safe 5")]
    Safe5,
    #[serde(other)]
    Unknown,
}

impl DeviceModel {
    /// Whether this is the legacy family, which signs typed data from pre-computed hashes.
    pub fn is_legacy(self) -> bool {
        self == Self::One
    }
}

impl fmt::Display for DeviceModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::One => "1",
            Self::T => "T",
            Self::Safe3 => "Safe 3",
            Self::Safe5 => "Safe 5",
            Self::Unknown => "unknown",
        })
    }
}

/// The subset of device features used by the methods.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Features {
    pub model: DeviceModel,
    pub major_version: u64,
    pub minor_version: u64,
    pub patch_version: u64,
    #[serde(default)]
    pub label: Option<String>,
}

impl Features {
    pub fn new(model: DeviceModel, firmware: Version) -> Self {
        Self {
            model,
            major_version: firmware.major,
            minor_version: firmware.minor,
            patch_version: firmware.patch,
            label: None,
        }
    }

    pub fn firmware_version(&self) -> Version {
        Version::new(self.major_version, self.minor_version, self.patch_version)
    }
}

/// A connected device: a transport plus the features it reported.
///
/// Methods borrow the device mutably for their whole run, so exchanges of different methods
/// never interleave.
pub struct Device<T> {
    transport: T,
    features: Features,
}

impl<T: fmt::Debug> fmt::Debug for Device<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("model", &self.features.model)
            .field("firmware", &self.features.firmware_version())
            .field("transport", &self.transport)
            .finish()
    }
}

impl<T: Transport> Device<T> {
    pub fn new(transport: T, features: Features) -> Self {
        Self { transport, features }
    }

    pub fn features(&self) -> &Features {
        &self.features
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Fails with `Method_NotAllowed` if the firmware is outside of `range`.
    pub fn check_firmware(&self, range: &FirmwareRange) -> Result<(), ConnectError> {
        let version = self.features.firmware_version();
        let bounds = range.bounds(self.features.model.is_legacy());
        if !bounds.contains(&version) {
            debug!(%version, min = %bounds.min, "firmware outside of the supported range");
            return Err(ConnectError::not_allowed(format!(
                "Method not allowed for this configuration: firmware {version} {}",
                describe_bounds(bounds)
            )));
        }
        Ok(())
    }

    /// Sends `request` and waits for a response whose kind is in `expected`.
    ///
    /// Button requests are acknowledged on the way, a `Failure` response becomes
    /// [`TransportError::Failure`] and any other kind is a protocol violation.
    #[instrument(level = "debug", skip_all, fields(request = %M::MESSAGE_TYPE))]
    pub async fn typed_call<M: ProtocolMessage>(
        &mut self,
        request: &M,
        expected: &[MessageType],
    ) -> Result<EncodedMessage, TransportError> {
        let mut response = self.exchange(request.to_encoded()).await?;
        loop {
            match response.kind() {
                Some(MessageType::ButtonRequest) => {
                    let button = response.decode::<ButtonRequest>()?;
                    debug!(code = ?button.code, "acknowledging button request");
                    response = self.exchange(ButtonAck {}.to_encoded()).await?;
                }
                Some(MessageType::Failure) => {
                    let failure = response.decode::<Failure>()?;
                    debug!(code = ?failure.code, message = ?failure.message, "device failure");
                    return Err(TransportError::Failure {
                        code: failure.failure_type(),
                        message: failure.message,
                    });
                }
                Some(kind) if expected.contains(&kind) => return Ok(response),
                _ => {
                    return Err(TransportError::UnexpectedMessage {
                        expected: expected.to_vec(),
                        got: response.to_string(),
                    });
                }
            }
        }
    }

    async fn exchange(
        &mut self,
        message: EncodedMessage,
    ) -> Result<EncodedMessage, TransportError> {
        trace!(%message, "->");
        let response = self.transport.call(message).await?;
        trace!(%response, "<-");
        Ok(response)
    }
}

fn describe_bounds(bounds: &FirmwareBounds) -> String {
    match &bounds.max {
        Some(max) => format!("is outside of {}..={max}", bounds.min),
        None => format!("is lower than {}", bounds.min),
    }
}
