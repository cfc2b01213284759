//! Ethereum-facing concerns: networks, ownership lookups, name
//! normalization and upload signature verification.

mod normalize;
mod oracle;
mod verify;

pub use normalize::{is_normalized, normalize};
pub use oracle::{namehash, LocalhostContracts, RpcOracle};
pub use verify::{upload_signing_hash, verified_address, UploadClaim};

use std::fmt;
use std::str::FromStr;

use alloy_primitives::Address;
use async_trait::async_trait;
use thiserror::Error;

/// A naming-system deployment the service can serve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Network {
    Mainnet,
    Sepolia,
    Holesky,
    /// Development-only network, gated on the environment flag
    Localhost,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Sepolia => "sepolia",
            Network::Holesky => "holesky",
            Network::Localhost => "localhost",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for unrecognized network names
#[derive(Error, Debug)]
#[error("unknown network: {0}")]
pub struct UnknownNetwork(String);

impl FromStr for Network {
    type Err = UnknownNetwork;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mainnet" => Ok(Network::Mainnet),
            "sepolia" => Ok(Network::Sepolia),
            "holesky" => Ok(Network::Holesky),
            "localhost" => Ok(Network::Localhost),
            other => Err(UnknownNetwork(other.to_string())),
        }
    }
}

/// The oracle's answer for a name, fetched fresh per request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ownership {
    pub owner: Option<Address>,
    pub available: bool,
}

/// Oracle-specific errors
#[derive(Error, Debug)]
pub enum OracleError {
    #[error("no RPC endpoint configured for network {0}")]
    NoEndpoint(Network),

    #[error("no contract addresses configured for network {0}")]
    NoContracts(Network),

    #[error("RPC transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("malformed RPC response: {0}")]
    Decode(String),
}

/// On-chain ownership and availability of a name.
///
/// Consumed as a black-box capability; answers are never cached so storage
/// decisions always derive from the chain's current state.
#[async_trait]
pub trait OwnershipOracle: Send + Sync {
    /// Resolve the owner of a name, `None` when unowned.
    async fn owner(&self, network: Network, name: &str) -> Result<Option<Address>, OracleError>;

    /// Resolve owner and availability together.
    async fn owner_and_available(
        &self,
        network: Network,
        name: &str,
    ) -> Result<Ownership, OracleError>;
}

/// A name with more than two labels is a subname of its parent.
pub fn is_subname(name: &str) -> bool {
    name.split('.').count() > 2
}

/// Strip the leftmost label: `sub.test.eth` -> `test.eth`
pub fn parent_name(name: &str) -> Option<&str> {
    name.split_once('.').map(|(_, parent)| parent)
}

/// Whether `address` owns the parent of `name`.
pub async fn is_parent_owner(
    oracle: &dyn OwnershipOracle,
    network: Network,
    name: &str,
    address: Address,
) -> Result<bool, OracleError> {
    let Some(parent) = parent_name(name) else {
        return Ok(false);
    };

    let parent_owner = oracle.owner(network, parent).await?;
    Ok(parent_owner == Some(address))
}

#[cfg(test)]
pub(crate) mod testing {
    //! Programmable oracle double for unit tests

    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    pub struct MockOracle {
        entries: Mutex<HashMap<(Network, String), Ownership>>,
    }

    impl MockOracle {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set(&self, network: Network, name: &str, owner: Option<Address>, available: bool) {
            self.entries
                .lock()
                .unwrap()
                .insert((network, name.to_string()), Ownership { owner, available });
        }
    }

    #[async_trait]
    impl OwnershipOracle for MockOracle {
        async fn owner(
            &self,
            network: Network,
            name: &str,
        ) -> Result<Option<Address>, OracleError> {
            Ok(self
                .entries
                .lock()
                .unwrap()
                .get(&(network, name.to_string()))
                .and_then(|ownership| ownership.owner))
        }

        async fn owner_and_available(
            &self,
            network: Network,
            name: &str,
        ) -> Result<Ownership, OracleError> {
            Ok(self
                .entries
                .lock()
                .unwrap()
                .get(&(network, name.to_string()))
                .copied()
                .unwrap_or(Ownership {
                    owner: None,
                    available: true,
                }))
        }
    }
}
