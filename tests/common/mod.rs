//! Shared fixtures for the HTTP API tests: an in-process server over the
//! in-memory store, a programmable ownership oracle and a signing helper
//! that produces real recoverable signatures.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use alloy_primitives::Address;
use async_trait::async_trait;
use axum_test::TestServer;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use k256::ecdsa::SigningKey;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use ens_media_server::config::{Config, Environment};
use ens_media_server::eth::{upload_signing_hash, Network, OracleError, Ownership, OwnershipOracle};
use ens_media_server::media::MediaSlot;
use ens_media_server::storage::{
    MemoryStore, ObjectPage, ObjectStore, PutReceipt, StorageError, StoredObject,
};
use ens_media_server::{app, AppState};

/// Programmable oracle: unset names answer unowned and available.
#[derive(Default)]
pub struct StaticOracle {
    entries: Mutex<HashMap<(Network, String), Ownership>>,
}

impl StaticOracle {
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
impl OwnershipOracle for StaticOracle {
    async fn owner(&self, network: Network, name: &str) -> Result<Option<Address>, OracleError> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .get(&(network, name.to_string()))
            .and_then(|o| o.owner))
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

/// Store wrapper whose receipts report a mangled key, to exercise the
/// post-write verification path.
pub struct MisplacingStore {
    inner: MemoryStore,
}

impl MisplacingStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
        }
    }
}

#[async_trait]
impl ObjectStore for MisplacingStore {
    async fn get(&self, key: &str) -> Result<Option<StoredObject>, StorageError> {
        self.inner.get(key).await
    }

    async fn put(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<PutReceipt, StorageError> {
        self.inner.put(key, data, content_type).await?;
        Ok(PutReceipt {
            key: format!("{}.tmp", key),
        })
    }

    async fn list(&self, prefix: &str, cursor: Option<String>) -> Result<ObjectPage, StorageError> {
        self.inner.list(prefix, cursor).await
    }

    async fn delete(&self, keys: &[String]) -> Result<(), StorageError> {
        self.inner.delete(keys).await
    }
}

/// Everything a test needs to drive the server and inspect its state
pub struct TestApp {
    pub server: TestServer,
    pub avatars: Arc<MemoryStore>,
    pub headers: Arc<MemoryStore>,
    pub oracle: Arc<StaticOracle>,
}

pub fn spawn_app() -> TestApp {
    spawn_app_with_env(Environment::Dev)
}

pub fn spawn_app_with_env(environment: Environment) -> TestApp {
    let avatars = Arc::new(MemoryStore::new());
    let headers = Arc::new(MemoryStore::new());
    let oracle = Arc::new(StaticOracle::new());

    let mut config = Config::default();
    config.environment = environment;

    let state = AppState::new(
        config,
        avatars.clone(),
        headers.clone(),
        oracle.clone(),
    );

    TestApp {
        server: TestServer::new(app(state)).unwrap(),
        avatars,
        headers,
        oracle,
    }
}

/// Server whose avatar store reports mangled put receipts
pub fn spawn_misplacing_app() -> (TestServer, Arc<StaticOracle>) {
    let oracle = Arc::new(StaticOracle::new());
    let state = AppState::new(
        Config::default(),
        Arc::new(MisplacingStore::new()),
        Arc::new(MemoryStore::new()),
        oracle.clone(),
    );

    (TestServer::new(app(state)).unwrap(), oracle)
}

pub struct Signer {
    key: SigningKey,
    pub address: Address,
}

impl Signer {
    /// Deterministic signer from a one-byte seed
    pub fn from_seed(seed: u8) -> Self {
        let key = SigningKey::from_bytes((&[seed; 32]).into()).unwrap();
        let point = key.verifying_key().to_encoded_point(false);
        let address = Address::from_raw_public_key(&point.as_bytes()[1..]);
        Self { key, address }
    }

    /// Sign an upload claim, returning the 0x-hex 65-byte signature
    pub fn sign_upload(&self, slot: MediaSlot, expiry: &str, name: &str, image: &[u8]) -> String {
        let content_hash = format!("0x{}", hex::encode(Sha256::digest(image)));
        let digest = upload_signing_hash(slot, expiry, name, &content_hash);

        let (signature, recovery) = self
            .key
            .sign_prehash_recoverable(digest.as_slice())
            .unwrap();
        let mut raw = signature.to_bytes().to_vec();
        raw.push(27 + recovery.to_byte());

        format!("0x{}", hex::encode(raw))
    }
}

pub fn jpeg_data_url(bytes: &[u8]) -> String {
    format!("data:image/jpeg;base64,{}", STANDARD.encode(bytes))
}

pub fn far_expiry() -> String {
    (unix_time_ms() + 3_600_000).to_string()
}

pub fn past_expiry() -> String {
    "1000".to_string()
}

fn unix_time_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis()
}

/// A fully signed upload body for `name` on `slot`
pub fn upload_body(signer: &Signer, slot: MediaSlot, name: &str, image: &[u8]) -> Value {
    upload_body_with_expiry(signer, slot, name, image, far_expiry())
}

pub fn upload_body_with_expiry(
    signer: &Signer,
    slot: MediaSlot,
    name: &str,
    image: &[u8],
    expiry: String,
) -> Value {
    let sig = signer.sign_upload(slot, &expiry, name, image);

    json!({
        "expiry": expiry,
        "dataURL": jpeg_data_url(image),
        "sig": sig,
        "unverifiedAddress": signer.address.to_checksum(None),
    })
}
