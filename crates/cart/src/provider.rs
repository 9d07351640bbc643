//! Lifetime scope for a [`CartStore`].
//!
//! Whatever owns the UI tree owns a [`CartProvider`]: it mounts the cart once
//! at startup, hands `&CartStore` to consumers through [`CartProvider::cart`],
//! and unmounts it on teardown so the last cart state reaches storage.

use tracing::info;

use crate::config::CartConfig;
use crate::error::{CartError, Result};
use crate::storage::{FileStore, KeyValueStore, MemoryStore};
use crate::store::CartStore;

/// Owner of the active cart, if any.
#[derive(Debug, Default)]
pub struct CartProvider {
    store: Option<CartStore>,
}

impl CartProvider {
    /// Create a provider with no active cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { store: None }
    }

    /// Hydrate a cart from `storage` and make it the active cart.
    ///
    /// A previously mounted cart is unmounted first.
    pub async fn mount<S: KeyValueStore>(&mut self, storage: S, config: &CartConfig) -> &CartStore {
        self.unmount().await;

        let store = CartStore::hydrate(storage, config).await;
        info!(lines = store.items().len(), "Cart mounted");
        self.store.insert(store)
    }

    /// Mount a cart on the storage described by `config`: files under
    /// `storage_dir` when set, otherwise memory.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Persistence` if the storage directory cannot be
    /// created.
    pub async fn mount_from_config(&mut self, config: &CartConfig) -> Result<&CartStore> {
        match &config.storage_dir {
            Some(dir) => {
                let storage = FileStore::open(dir).await?;
                Ok(self.mount(storage, config).await)
            }
            None => Ok(self.mount(MemoryStore::new(), config).await),
        }
    }

    /// The active cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NotInitialized` if no cart is mounted.
    pub fn cart(&self) -> Result<&CartStore> {
        self.store.as_ref().ok_or(CartError::NotInitialized)
    }

    /// Whether a cart is currently mounted.
    #[must_use]
    pub const fn is_mounted(&self) -> bool {
        self.store.is_some()
    }

    /// Flush and drop the active cart. Does nothing if none is mounted.
    pub async fn unmount(&mut self) {
        if let Some(store) = self.store.take() {
            store.close().await;
            info!("Cart unmounted");
        }
    }
}
