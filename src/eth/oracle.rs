//! JSON-RPC backed ownership oracle
//!
//! Answers ownership and availability questions with `eth_call` against the
//! ENS registry and, for second-level `.eth` names, the base registrar.
//! Contract addresses are the well-known deployments shared by mainnet,
//! sepolia and holesky; the localhost network takes its addresses from
//! configuration.

use std::collections::HashMap;

use alloy_primitives::{address, keccak256, Address, B256};
use async_trait::async_trait;
use serde::Deserialize;

use super::{Network, OracleError, Ownership, OwnershipOracle};

const ENS_REGISTRY: Address = address!("00000000000C2E074eC69A0dFb2997BA6C7d2e1e");
const ETH_BASE_REGISTRAR: Address = address!("57f1887a8BF19b14fC0dF6Fd9B2acc9Af147eA85");

/// Contract addresses for the dev-only localhost network
#[derive(Debug, Clone, Copy)]
pub struct LocalhostContracts {
    pub registry: Address,
    pub base_registrar: Address,
}

/// Ownership oracle speaking JSON-RPC to one endpoint per network
pub struct RpcOracle {
    http: reqwest::Client,
    endpoints: HashMap<Network, String>,
    localhost: Option<LocalhostContracts>,
}

#[derive(Deserialize)]
struct RpcResponse {
    result: Option<String>,
    error: Option<RpcErrorBody>,
}

#[derive(Deserialize)]
struct RpcErrorBody {
    message: String,
}

impl RpcOracle {
    pub fn new(
        endpoints: HashMap<Network, String>,
        localhost: Option<LocalhostContracts>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoints,
            localhost,
        }
    }

    fn registry(&self, network: Network) -> Result<Address, OracleError> {
        match network {
            Network::Localhost => self
                .localhost
                .map(|contracts| contracts.registry)
                .ok_or(OracleError::NoContracts(network)),
            _ => Ok(ENS_REGISTRY),
        }
    }

    fn registrar(&self, network: Network) -> Result<Address, OracleError> {
        match network {
            Network::Localhost => self
                .localhost
                .map(|contracts| contracts.base_registrar)
                .ok_or(OracleError::NoContracts(network)),
            _ => Ok(ETH_BASE_REGISTRAR),
        }
    }

    async fn eth_call(
        &self,
        network: Network,
        to: Address,
        data: Vec<u8>,
    ) -> Result<Vec<u8>, OracleError> {
        let endpoint = self
            .endpoints
            .get(&network)
            .ok_or(OracleError::NoEndpoint(network))?;

        let payload = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_call",
            "params": [
                { "to": to.to_string(), "data": format!("0x{}", hex::encode(data)) },
                "latest",
            ],
        });

        let response: RpcResponse = self
            .http
            .post(endpoint)
            .json(&payload)
            .send()
            .await?
            .json()
            .await?;

        if let Some(error) = response.error {
            return Err(OracleError::Rpc(error.message));
        }

        let result = response
            .result
            .ok_or_else(|| OracleError::Decode("response carries neither result nor error".into()))?;

        hex::decode(result.trim_start_matches("0x"))
            .map_err(|e| OracleError::Decode(format!("result is not hex: {}", e)))
    }
}

#[async_trait]
impl OwnershipOracle for RpcOracle {
    async fn owner(&self, network: Network, name: &str) -> Result<Option<Address>, OracleError> {
        let mut data = selector(b"owner(bytes32)").to_vec();
        data.extend_from_slice(namehash(name).as_slice());

        let output = self.eth_call(network, self.registry(network)?, data).await?;
        decode_address_word(&output)
    }

    async fn owner_and_available(
        &self,
        network: Network,
        name: &str,
    ) -> Result<Ownership, OracleError> {
        let labels: Vec<&str> = name.split('.').collect();
        let is_2ld_eth = labels.len() == 2 && labels[1] == "eth";

        let owner = self.owner(network, name).await?;

        // Availability is only a registrar concept for second-level .eth
        // names; everywhere else an unowned name counts as available.
        let available = if is_2ld_eth {
            let mut data = selector(b"available(uint256)").to_vec();
            data.extend_from_slice(keccak256(labels[0]).as_slice());

            let output = self
                .eth_call(network, self.registrar(network)?, data)
                .await?;
            decode_bool_word(&output)?
        } else {
            owner.is_none()
        };

        Ok(Ownership { owner, available })
    }
}

/// EIP-137 recursive name hash.
pub fn namehash(name: &str) -> B256 {
    let mut node = B256::ZERO;
    if name.is_empty() {
        return node;
    }

    for label in name.rsplit('.') {
        let mut combined = [0u8; 64];
        combined[..32].copy_from_slice(node.as_slice());
        combined[32..].copy_from_slice(keccak256(label).as_slice());
        node = keccak256(combined);
    }

    node
}

fn selector(signature: &[u8]) -> [u8; 4] {
    let digest = keccak256(signature);
    [digest[0], digest[1], digest[2], digest[3]]
}

fn decode_address_word(output: &[u8]) -> Result<Option<Address>, OracleError> {
    if output.len() < 32 {
        return Err(OracleError::Decode(format!(
            "expected a 32-byte word, got {} bytes",
            output.len()
        )));
    }

    let address = Address::from_slice(&output[12..32]);
    Ok((address != Address::ZERO).then_some(address))
}

fn decode_bool_word(output: &[u8]) -> Result<bool, OracleError> {
    if output.len() < 32 {
        return Err(OracleError::Decode(format!(
            "expected a 32-byte word, got {} bytes",
            output.len()
        )));
    }

    Ok(output[31] != 0)
}
