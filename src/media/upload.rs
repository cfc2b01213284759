//! Authenticated upload pipeline
//!
//! Every check is a hard gate; the first failure wins and nothing is
//! written before all gates pass. The expiry gate deliberately runs after
//! the ownership gates so that a request failing both reports the more
//! specific ownership error.

use std::time::{SystemTime, UNIX_EPOCH};

use alloy_primitives::Address;
use sha2::{Digest, Sha256};

use crate::error::AppError;
use crate::eth::{
    is_normalized, is_parent_owner, is_subname, parent_name, verified_address, Network,
    OwnershipOracle, UploadClaim,
};
use crate::media::{data_url_to_bytes, keys, MediaSlot, IMAGE_CONTENT_TYPE, MAX_IMAGE_SIZE};
use crate::storage::ObjectStore;

/// Validated request body of a PUT upload
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Unix-milliseconds expiry, decimal string as signed
    pub expiry: String,
    /// `data:image/...;base64,...` payload
    pub data_url: String,
    /// 0x-prefixed signature hex
    pub sig: String,
    /// Address the uploader claims to control
    pub unverified_address: Address,
}

/// Run the upload pipeline for one request.
///
/// On success the image is stored at the registered key (owned name) or at
/// the uploader's unregistered key (available name).
pub async fn process_upload(
    store: &dyn ObjectStore,
    oracle: &dyn OwnershipOracle,
    network: Network,
    slot: MediaSlot,
    name: &str,
    request: UploadRequest,
) -> Result<(), AppError> {
    let decoded = data_url_to_bytes(&request.data_url)
        .ok_or_else(|| AppError::BadRequest("Invalid dataURL".to_string()))?;

    let content_hash = format!("0x{}", hex::encode(Sha256::digest(&decoded.bytes)));

    if decoded.mime != IMAGE_CONTENT_TYPE {
        return Err(AppError::UnsupportedMediaType(format!(
            "File must be of type {}",
            IMAGE_CONTENT_TYPE
        )));
    }

    if !is_normalized(name) {
        return Err(AppError::BadRequest(
            "Name must be in normalized form".to_string(),
        ));
    }

    let claim = UploadClaim {
        slot,
        expiry: &request.expiry,
        name,
        content_hash: &content_hash,
        signature: &request.sig,
        unverified_address: request.unverified_address,
    };
    let Some(verified) = verified_address(&claim) else {
        return Err(AppError::BadRequest("Invalid signature".to_string()));
    };

    if decoded.bytes.len() > MAX_IMAGE_SIZE {
        return Err(AppError::PayloadTooLarge("Image is too large".to_string()));
    }

    let ownership = oracle.owner_and_available(network, name).await?;

    if !ownership.available {
        match ownership.owner {
            None => return Err(AppError::NotFound("Name not found".to_string())),
            Some(owner) if owner != verified => {
                return Err(AppError::Forbidden(format!(
                    "Address {} is not the owner of {}",
                    verified.to_checksum(None),
                    name
                )));
            }
            Some(_) => {}
        }
    } else if is_subname(name) && !is_parent_owner(oracle, network, name, verified).await? {
        let parent = parent_name(name).unwrap_or(name);
        return Err(AppError::Forbidden(format!(
            "Address {} is not the owner of {}",
            verified.to_checksum(None),
            parent
        )));
    }

    let expiry: u128 = request
        .expiry
        .parse()
        .map_err(|_| AppError::BadRequest("expiry value is not number".to_string()))?;
    if expiry < unix_time_ms() {
        return Err(AppError::Forbidden("Signature expired".to_string()));
    }

    let key = if ownership.available {
        // The name has (re)entered the available state; a registered image
        // from a prior registration must not keep resolving.
        store
            .delete(&[keys::registered(network, name)])
            .await?;
        keys::unregistered(network, name, verified)
    } else {
        keys::registered(network, name)
    };

    let receipt = store.put(&key, decoded.bytes, IMAGE_CONTENT_TYPE).await?;
    if receipt.key != key {
        return Err(AppError::Internal(format!("{} not uploaded", name)));
    }

    Ok(())
}

fn unix_time_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}
