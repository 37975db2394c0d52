//! Ethereum network definitions.

use serde::{Deserialize, Serialize};

/// An Ethereum network known to the device.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EthereumNetwork {
    pub name: String,
    pub shortcut: String,
    pub chain_id: u64,
    /// SLIP-44 coin type used at the second level of derivation paths.
    pub slip44: u32,
    /// Whether addresses on this network use the EIP-1191 chain-specific checksum.
    #[serde(default)]
    pub eip1191_checksum: bool,
}

impl EthereumNetwork {
    pub fn new(name: &str, shortcut: &str, chain_id: u64, slip44: u32) -> Self {
        Self {
            name: name.to_string(),
            shortcut: shortcut.to_string(),
            chain_id,
            slip44,
            eip1191_checksum: false,
        }
    }

    /// Marks the network as using the EIP-1191 checksum.
    pub fn with_eip1191_checksum(mut self) -> Self {
        self.eip1191_checksum = true;
        self
    }

    pub fn is_testnet(&self) -> bool {
        self.name.to_lowercase().contains("testnet")
    }
}

/// The networks shipped with the default configuration.
pub fn default_networks() -> Vec<EthereumNetwork> {
    vec![
        EthereumNetwork::new("Ethereum", "ETH", 1, 60),
        EthereumNetwork::new("Ethereum Testnet Ropsten", "tROP", 3, 1),
        EthereumNetwork::new("Ethereum Classic", "ETC", 61, 61),
        EthereumNetwork::new("Expanse", "EXP", 2, 40),
        EthereumNetwork::new("Ubiq", "UBQ", 8, 108),
        EthereumNetwork::new("RSK", "RBTC", 30, 137).with_eip1191_checksum(),
        EthereumNetwork::new("RSK Testnet", "tRBTC", 31, 37310).with_eip1191_checksum(),
    ]
}
