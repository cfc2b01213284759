//! Configuration management for the ENS media server

use std::collections::HashMap;
use std::env;

use alloy_primitives::Address;

use crate::eth::{LocalhostContracts, Network};

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub rpc: RpcConfig,
    pub environment: Environment,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: Option<String>,
    pub avatar_bucket: String,
    pub header_bucket: String,
}

#[derive(Debug, Clone)]
pub struct RpcConfig {
    /// One JSON-RPC endpoint per served network
    pub endpoints: HashMap<Network, String>,
    /// Contract addresses for the localhost network, dev mode only
    pub localhost_contracts: Option<LocalhostContracts>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Production,
}

impl Config {
    pub fn is_dev(&self) -> bool {
        self.environment == Environment::Dev
    }

    pub fn from_env() -> Result<Self, env::VarError> {
        let environment = match env::var("ENVIRONMENT").as_deref() {
            Ok("dev") => Environment::Dev,
            _ => Environment::Production,
        };

        Ok(Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("SERVER_PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()
                    .unwrap_or(3000),
            },
            storage: StorageConfig {
                endpoint: env::var("S3_ENDPOINT")?,
                access_key: env::var("S3_ACCESS_KEY")?,
                secret_key: env::var("S3_SECRET_KEY")?,
                region: env::var("S3_REGION").ok(),
                avatar_bucket: env::var("AVATAR_BUCKET")?,
                header_bucket: env::var("HEADER_BUCKET")?,
            },
            rpc: RpcConfig {
                endpoints: parse_endpoint_map(
                    &env::var("WEB3_ENDPOINT_MAP").unwrap_or_else(|_| "{}".to_string()),
                ),
                localhost_contracts: localhost_contracts_from_env(),
            },
            environment,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            storage: StorageConfig {
                endpoint: "http://localhost:9000".to_string(),
                access_key: "admin".to_string(),
                secret_key: "password123".to_string(),
                region: Some("us-east-1".to_string()),
                avatar_bucket: "avatars".to_string(),
                header_bucket: "headers".to_string(),
            },
            rpc: RpcConfig {
                endpoints: HashMap::new(),
                localhost_contracts: None,
            },
            environment: Environment::Dev,
        }
    }
}

/// Parse the `WEB3_ENDPOINT_MAP` JSON object, e.g.
/// `{"mainnet": "https://...", "sepolia": "https://..."}`.
/// Unknown network names are skipped with a warning.
pub fn parse_endpoint_map(raw: &str) -> HashMap<Network, String> {
    let parsed: HashMap<String, String> = match serde_json::from_str(raw) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!("Failed to parse WEB3_ENDPOINT_MAP: {}", e);
            return HashMap::new();
        }
    };

    let mut endpoints = HashMap::new();
    for (name, endpoint) in parsed {
        match name.parse::<Network>() {
            Ok(network) => {
                endpoints.insert(network, endpoint);
            }
            Err(_) => {
                tracing::warn!("Skipping endpoint for unknown network: {}", name);
            }
        }
    }

    endpoints
}

fn localhost_contracts_from_env() -> Option<LocalhostContracts> {
    let registry: Address = env::var("LOCALHOST_ENS_REGISTRY").ok()?.parse().ok()?;
    let base_registrar: Address = env::var("LOCALHOST_ENS_BASE_REGISTRAR")
        .ok()?
        .parse()
        .ok()?;

    Some(LocalhostContracts {
        registry,
        base_registrar,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_map_parses_known_networks() {
        let endpoints = parse_endpoint_map(
            r#"{"mainnet": "https://rpc.example/m", "sepolia": "https://rpc.example/s"}"#,
        );

        assert_eq!(
            endpoints.get(&Network::Mainnet).map(String::as_str),
            Some("https://rpc.example/m")
        );
        assert_eq!(
            endpoints.get(&Network::Sepolia).map(String::as_str),
            Some("https://rpc.example/s")
        );
    }

    #[test]
    fn endpoint_map_skips_unknown_networks_and_bad_json() {
        let endpoints = parse_endpoint_map(r#"{"goerli": "https://rpc.example/g"}"#);
        assert!(endpoints.is_empty());

        assert!(parse_endpoint_map("not json").is_empty());
    }
}
