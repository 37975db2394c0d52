//! Firmware requirements per device family.

use semver::Version;
use serde::{Deserialize, Serialize};

/// Inclusive firmware bounds for one device family.
///
/// A `max` of `None` means there is no upper bound.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirmwareBounds {
    pub min: Version,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<Version>,
}

impl FirmwareBounds {
    pub fn at_least(min: Version) -> Self {
        Self { min, max: None }
    }

    pub fn contains(&self, version: &Version) -> bool {
        *version >= self.min && self.max.as_ref().is_none_or(|max| version <= max)
    }
}

/// Firmware range of a method, split by device family.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirmwareRange {
    /// Legacy family (model "1").
    pub model_1: FirmwareBounds,
    /// Every other family.
    pub model_2: FirmwareBounds,
}

impl FirmwareRange {
    /// The firmware range of typed data signing.
    pub fn sign_typed_data() -> Self {
        Self {
            model_1: FirmwareBounds::at_least(Version::new(1, 10, 5)),
            model_2: FirmwareBounds::at_least(Version::new(2, 4, 3)),
        }
    }

    pub fn bounds(&self, legacy: bool) -> &FirmwareBounds {
        if legacy { &self.model_1 } else { &self.model_2 }
    }
}
