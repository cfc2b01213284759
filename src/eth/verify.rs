//! EIP-712 upload signature verification
//!
//! Uploads are authorized by a typed-data signature over
//! `Upload(string upload, string expiry, string name, string hash)` under the
//! fixed domain `{name: "Ethereum Name Service", version: "1"}`. Binding the
//! slot and the content hash into the message prevents a signature issued for
//! one slot or one image from being replayed for another; the expiry bounds
//! the replay window and the name prevents cross-name replay.

use alloy_primitives::{keccak256, Address, B256};
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use thiserror::Error;

use crate::media::MediaSlot;

const DOMAIN_NAME: &str = "Ethereum Name Service";
const DOMAIN_VERSION: &str = "1";
const DOMAIN_TYPE: &str = "EIP712Domain(string name,string version)";
const UPLOAD_TYPE: &str = "Upload(string upload,string expiry,string name,string hash)";

/// A request-scoped signed upload assertion. Consumed once, never persisted.
#[derive(Debug, Clone)]
pub struct UploadClaim<'a> {
    pub slot: MediaSlot,
    /// Unix-milliseconds expiry, as the decimal string that was signed
    pub expiry: &'a str,
    pub name: &'a str,
    /// 0x-prefixed sha256 hex digest of the uploaded bytes
    pub content_hash: &'a str,
    /// 0x-prefixed 65-byte signature
    pub signature: &'a str,
    pub unverified_address: Address,
}

#[derive(Error, Debug)]
enum SignatureError {
    #[error("signature is not hex: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("signature must be 65 bytes, got {0}")]
    Length(usize),

    #[error("invalid recovery id: {0}")]
    RecoveryId(u8),

    #[error("ecdsa error: {0}")]
    Ecdsa(#[from] k256::ecdsa::Error),
}

/// EIP-712 signing hash for an upload message.
///
/// Exposed so clients and tests can produce signatures over the exact bytes
/// the server verifies.
pub fn upload_signing_hash(slot: MediaSlot, expiry: &str, name: &str, content_hash: &str) -> B256 {
    let mut encoded = Vec::with_capacity(160);
    encoded.extend_from_slice(keccak256(UPLOAD_TYPE).as_slice());
    encoded.extend_from_slice(keccak256(slot.as_str()).as_slice());
    encoded.extend_from_slice(keccak256(expiry).as_slice());
    encoded.extend_from_slice(keccak256(name).as_slice());
    encoded.extend_from_slice(keccak256(content_hash).as_slice());
    let struct_hash = keccak256(&encoded);

    let mut preimage = Vec::with_capacity(66);
    preimage.extend_from_slice(&[0x19, 0x01]);
    preimage.extend_from_slice(domain_separator().as_slice());
    preimage.extend_from_slice(struct_hash.as_slice());
    keccak256(&preimage)
}

fn domain_separator() -> B256 {
    let mut encoded = Vec::with_capacity(96);
    encoded.extend_from_slice(keccak256(DOMAIN_TYPE).as_slice());
    encoded.extend_from_slice(keccak256(DOMAIN_NAME).as_slice());
    encoded.extend_from_slice(keccak256(DOMAIN_VERSION).as_slice());
    keccak256(&encoded)
}

/// Verify an upload claim.
///
/// Returns the claimed address only when the signature recovers to it.
/// Every failure mode — undecodable signature, recovery failure, signer
/// mismatch — yields `None`; failures are logged, never propagated.
pub fn verified_address(claim: &UploadClaim<'_>) -> Option<Address> {
    let digest = upload_signing_hash(claim.slot, claim.expiry, claim.name, claim.content_hash);

    match recover(digest, claim.signature) {
        Ok(recovered) if recovered == claim.unverified_address => Some(claim.unverified_address),
        Ok(recovered) => {
            tracing::warn!(
                claimed = %claim.unverified_address,
                recovered = %recovered,
                "upload signature recovered to a different address"
            );
            None
        }
        Err(e) => {
            tracing::warn!("error while verifying upload signature: {}", e);
            None
        }
    }
}

fn recover(digest: B256, signature: &str) -> Result<Address, SignatureError> {
    let raw = hex::decode(signature.trim_start_matches("0x"))?;
    if raw.len() != 65 {
        return Err(SignatureError::Length(raw.len()));
    }

    let mut signature = Signature::from_slice(&raw[..64])?;
    let mut v = raw[64];
    if v >= 27 {
        v -= 27;
    }

    // High-s signatures are folded down; the recovery parity flips with s.
    if let Some(normalized) = signature.normalize_s() {
        signature = normalized;
        v ^= 1;
    }

    let recovery = RecoveryId::from_byte(v).ok_or(SignatureError::RecoveryId(raw[64]))?;
    let key = VerifyingKey::recover_from_prehash(digest.as_slice(), &signature, recovery)?;

    let point = key.to_encoded_point(false);
    Ok(Address::from_raw_public_key(&point.as_bytes()[1..]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use k256::ecdsa::SigningKey;

    fn test_signer() -> (SigningKey, Address) {
        let key = SigningKey::from_bytes((&[0x42u8; 32]).into()).unwrap();
        let point = key.verifying_key().to_encoded_point(false);
        let address = Address::from_raw_public_key(&point.as_bytes()[1..]);
        (key, address)
    }

    fn sign(key: &SigningKey, digest: B256) -> String {
        let (signature, recovery) = key.sign_prehash_recoverable(digest.as_slice()).unwrap();
        let mut raw = signature.to_bytes().to_vec();
        raw.push(27 + recovery.to_byte());
        format!("0x{}", hex::encode(raw))
    }

    fn claim<'a>(slot: MediaSlot, signature: &'a str, address: Address) -> UploadClaim<'a> {
        UploadClaim {
            slot,
            expiry: "1700000000000",
            name: "test.eth",
            content_hash: "0xabc123",
            signature,
            unverified_address: address,
        }
    }

    #[test]
    fn valid_signature_returns_claimed_address() {
        let (key, address) = test_signer();
        let digest =
            upload_signing_hash(MediaSlot::Avatar, "1700000000000", "test.eth", "0xabc123");
        let signature = sign(&key, digest);

        let verified = verified_address(&claim(MediaSlot::Avatar, &signature, address));
        assert_eq!(verified, Some(address));
    }

    #[test]
    fn signature_for_other_slot_is_rejected() {
        let (key, address) = test_signer();
        let digest =
            upload_signing_hash(MediaSlot::Avatar, "1700000000000", "test.eth", "0xabc123");
        let signature = sign(&key, digest);

        // Same name, hash and expiry, replayed against the header slot.
        let verified = verified_address(&claim(MediaSlot::Header, &signature, address));
        assert_eq!(verified, None);
    }

    #[test]
    fn signature_over_different_content_is_rejected() {
        let (key, address) = test_signer();
        let digest =
            upload_signing_hash(MediaSlot::Avatar, "1700000000000", "test.eth", "0xother");
        let signature = sign(&key, digest);

        let verified = verified_address(&claim(MediaSlot::Avatar, &signature, address));
        assert_eq!(verified, None);
    }

    #[test]
    fn mismatched_claimed_address_is_rejected() {
        let (key, _) = test_signer();
        let digest =
            upload_signing_hash(MediaSlot::Avatar, "1700000000000", "test.eth", "0xabc123");
        let signature = sign(&key, digest);

        let other = Address::repeat_byte(0x11);
        let verified = verified_address(&claim(MediaSlot::Avatar, &signature, other));
        assert_eq!(verified, None);
    }

    #[test]
    fn garbage_signatures_are_rejected_not_propagated() {
        let (_, address) = test_signer();

        for bad in ["", "0x", "0xzz", "0x1234", &format!("0x{}", "00".repeat(65))] {
            assert_eq!(verified_address(&claim(MediaSlot::Avatar, bad, address)), None);
        }
    }

    #[test]
    fn signing_hash_differs_per_field() {
        let base = upload_signing_hash(MediaSlot::Avatar, "1", "test.eth", "0xaa");
        assert_ne!(
            base,
            upload_signing_hash(MediaSlot::Header, "1", "test.eth", "0xaa")
        );
        assert_ne!(
            base,
            upload_signing_hash(MediaSlot::Avatar, "2", "test.eth", "0xaa")
        );
        assert_ne!(
            base,
            upload_signing_hash(MediaSlot::Avatar, "1", "other.eth", "0xaa")
        );
        assert_ne!(
            base,
            upload_signing_hash(MediaSlot::Avatar, "1", "test.eth", "0xbb")
        );
    }
}
