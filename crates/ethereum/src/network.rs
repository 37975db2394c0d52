//! Network lookup, labels and address checksums.

use alloy_primitives::Address;
use connect_common::{ConnectError, path::from_hardened};
use connect_config::{ConnectConfig, EthereumNetwork};
use std::str::FromStr;

/// Returns the network whose SLIP-44 coin type is the second level of `path`.
pub fn network_for_path<'a>(
    config: &'a ConnectConfig,
    path: &[u32],
) -> Option<&'a EthereumNetwork> {
    let coin_type = *path.get(1)?;
    config.network_by_slip44(from_hardened(coin_type))
}

/// Replaces `#NETWORK` in `label` with the network name.
///
/// Every testnet is shown as "Testnet"; without a network the placeholder is dropped.
pub fn network_label(label: &str, network: Option<&EthereumNetwork>) -> String {
    let name = match network {
        Some(network) if network.is_testnet() => "Testnet",
        Some(network) => network.name.as_str(),
        None => "",
    };
    label.replace("#NETWORK", name)
}

/// Formats `address` with the checksum used by `network`: EIP-1191 for networks that opted in,
/// EIP-55 otherwise.
pub fn to_checksum_address(
    address: &str,
    network: Option<&EthereumNetwork>,
) -> Result<String, ConnectError> {
    let parsed = Address::from_str(address)
        .map_err(|err| ConnectError::runtime(format!("Invalid address {address}: {err}")))?;
    let chain_id =
        network.filter(|network| network.eip1191_checksum).map(|network| network.chain_id);
    Ok(parsed.to_checksum(chain_id))
}
