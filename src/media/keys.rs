//! Bucket key scheme
//!
//! Two namespaces per network: `registered` holds at most one image per
//! name (the confirmed owner's), `unregistered` holds one pending image per
//! claimant address. Claimant addresses are rendered in EIP-55 checksum
//! form so keys match across the upload and promotion paths.

use alloy_primitives::Address;

use crate::eth::Network;

pub fn registered(network: Network, name: &str) -> String {
    format!("{}/registered/{}", network, name)
}

pub fn unregistered(network: Network, name: &str, claimant: Address) -> String {
    format!(
        "{}/unregistered/{}/{}",
        network,
        name,
        claimant.to_checksum(None)
    )
}

/// Prefix covering every claimant's pending upload for a name
pub fn unregistered_prefix(network: Network, name: &str) -> String {
    format!("{}/unregistered/{}/", network, name)
}
