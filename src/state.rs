//! Application state management

use std::sync::Arc;

use crate::config::Config;
use crate::eth::OwnershipOracle;
use crate::media::MediaSlot;
use crate::storage::ObjectStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    avatar_store: Arc<dyn ObjectStore>,
    header_store: Arc<dyn ObjectStore>,
    oracle: Arc<dyn OwnershipOracle>,
}

impl AppState {
    pub fn new(
        config: Config,
        avatar_store: Arc<dyn ObjectStore>,
        header_store: Arc<dyn ObjectStore>,
        oracle: Arc<dyn OwnershipOracle>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                avatar_store,
                header_store,
                oracle,
            }),
        }
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// The object store backing a media slot
    pub fn store(&self, slot: MediaSlot) -> &dyn ObjectStore {
        match slot {
            MediaSlot::Avatar => self.inner.avatar_store.as_ref(),
            MediaSlot::Header => self.inner.header_store.as_ref(),
        }
    }

    pub fn oracle(&self) -> &dyn OwnershipOracle {
        self.inner.oracle.as_ref()
    }
}
