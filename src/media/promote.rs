//! Promotion of pending uploads
//!
//! A claimant may upload an image before their name is registered. Once the
//! oracle reports the name owned, the claimant's pending image is copied to
//! the registered key and every pending upload for the name — the promoted
//! one and any competing claimants' — is swept away.

use bytes::Bytes;

use crate::error::AppError;
use crate::eth::{Network, OwnershipOracle};
use crate::media::{keys, IMAGE_CONTENT_TYPE};
use crate::storage::ObjectStore;

/// A pending upload that was just promoted to the registered key
#[derive(Debug, Clone)]
pub struct PromotedMedia {
    pub content_type: Option<String>,
    /// The promoted bytes, returned so the caller can serve them without a
    /// second store read. `Bytes` clones share the buffer, so the single
    /// fetched body fans out to both the registered-key write and the
    /// response without copying.
    pub body: Bytes,
}

impl PromotedMedia {
    pub fn size(&self) -> usize {
        self.body.len()
    }
}

/// Find a pending upload belonging to the current owner of `name` and
/// promote it.
///
/// Returns `None` when the name is available, unowned, or has no pending
/// upload under its owner — without touching the store in the first two
/// cases. Idempotent: after a successful promotion the unregistered
/// namespace for the name is empty, so a second call is a no-op.
pub async fn find_and_promote_unregistered_media(
    store: &dyn ObjectStore,
    oracle: &dyn OwnershipOracle,
    network: Network,
    name: &str,
) -> Result<Option<PromotedMedia>, AppError> {
    let ownership = oracle.owner_and_available(network, name).await?;

    let Some(owner) = ownership.owner else {
        return Ok(None);
    };
    if ownership.available {
        return Ok(None);
    }

    let Some(pending) = store.get(&keys::unregistered(network, name, owner)).await? else {
        return Ok(None);
    };

    store
        .put(
            &keys::registered(network, name),
            pending.data.clone(),
            pending.content_type.as_deref().unwrap_or(IMAGE_CONTENT_TYPE),
        )
        .await?;

    sweep_unregistered(store, network, name).await?;

    Ok(Some(PromotedMedia {
        content_type: pending.content_type,
        body: pending.data,
    }))
}

/// Delete every pending upload for a name, across list pagination.
async fn sweep_unregistered(
    store: &dyn ObjectStore,
    network: Network,
    name: &str,
) -> Result<(), AppError> {
    let prefix = keys::unregistered_prefix(network, name);
    let mut cursor = None;

    loop {
        let page = store.list(&prefix, cursor.take()).await?;

        // An empty page ends the sweep even if the store claims more pages;
        // trusting the flag alone could spin forever.
        if page.keys.is_empty() {
            break;
        }

        store.delete(&page.keys).await?;

        if !page.truncated {
            break;
        }
        match page.cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    Ok(())
}
