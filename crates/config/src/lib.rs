//! # connect-config
//!
//! Configuration for the device methods.
//!
//! The configuration is assembled with [`figment`]: the built-in defaults are overridden by an
//! optional `connect.toml` (or the file named by `CONNECT_CONFIG`) and then by `CONNECT_`
//! prefixed environment variables, where `__` separates nested keys
//! (`CONNECT_TYPED_DATA__MAX_MEMBER_DEPTH=16`).

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

#[macro_use]
extern crate tracing;

use figment::{
    Figment, Metadata, Profile, Provider,
    providers::{Env, Format, Serialized, Toml},
    value::{Dict, Map},
};
use serde::{Deserialize, Serialize};

mod error;
pub use error::{ExtractConfigError, FAILED_TO_EXTRACT_CONFIG_MSG};

mod firmware;
pub use firmware::{FirmwareBounds, FirmwareRange};

mod networks;
pub use networks::{EthereumNetwork, default_networks};

/// Connect configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectConfig {
    /// Known Ethereum networks, looked up by SLIP-44 coin type.
    pub networks: Vec<EthereumNetwork>,
    /// Firmware requirements of the typed data signing method.
    pub sign_typed_data_firmware: FirmwareRange,
    pub typed_data: TypedDataConfig,
}

/// Limits applied while answering typed data requests.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedDataConfig {
    /// Maximum number of indices in a member path requested by the device, root included.
    pub max_member_depth: usize,
}

impl Default for TypedDataConfig {
    fn default() -> Self {
        Self { max_member_depth: 32 }
    }
}

impl Default for ConnectConfig {
    fn default() -> Self {
        Self {
            networks: default_networks(),
            sign_typed_data_firmware: FirmwareRange::sign_typed_data(),
            typed_data: TypedDataConfig::default(),
        }
    }
}

impl ConnectConfig {
    /// The default config file name.
    pub const FILE_NAME: &'static str = "connect.toml";

    /// Environment variable prefix.
    pub const ENV_PREFIX: &'static str = "CONNECT_";

    /// Returns the current `ConnectConfig`.
    ///
    /// See [`figment`](Self::figment) for more details.
    ///
    /// # Panics
    ///
    /// If the config is invalid, see [`load`](Self::load).
    #[track_caller]
    pub fn load_or_panic() -> Self {
        Self::from_provider(Self::figment())
    }

    /// Returns the current `ConnectConfig`, or the extraction error.
    pub fn load() -> Result<Self, ExtractConfigError> {
        Self::try_from(Self::figment())
    }

    /// Returns the config extracted from `provider`.
    ///
    /// # Panics
    ///
    /// If the provider does not yield a valid config.
    #[track_caller]
    pub fn from_provider<T: Provider>(provider: T) -> Self {
        trace!("load config with provider: {:?}", provider.metadata());
        match Self::try_from(provider) {
            Ok(config) => config,
            Err(err) => panic!("{err}"),
        }
    }

    /// Attempts to extract a `ConnectConfig` from `provider`.
    pub fn try_from<T: Provider>(provider: T) -> Result<Self, ExtractConfigError> {
        Figment::from(provider).extract().map_err(ExtractConfigError::new)
    }

    /// Returns the default figment: defaults, then the config file, then the environment.
    pub fn figment() -> Figment {
        Figment::from(Self::default())
            .merge(Toml::file(Env::var_or("CONNECT_CONFIG", Self::FILE_NAME)))
            .merge(Env::prefixed(Self::ENV_PREFIX).ignore(&["CONFIG"]).split("__"))
    }

    /// Looks up a network by SLIP-44 coin type.
    pub fn network_by_slip44(&self, slip44: u32) -> Option<&EthereumNetwork> {
        self.networks.iter().find(|network| network.slip44 == slip44)
    }

    /// Looks up a network by chain id.
    pub fn network_by_chain_id(&self, chain_id: u64) -> Option<&EthereumNetwork> {
        self.networks.iter().find(|network| network.chain_id == chain_id)
    }
}

impl Provider for ConnectConfig {
    fn metadata(&self) -> Metadata {
        Metadata::named("Connect Config")
    }

    #[track_caller]
    fn data(&self) -> Result<Map<Profile, Dict>, figment::Error> {
        Serialized::defaults(self).data()
    }
}
