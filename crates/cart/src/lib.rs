//! GoMarketplace Cart library.
//!
//! Holds the shopping cart of the mobile storefront in memory, keeps it in
//! sync with a local key-value store, and exposes the add / increment /
//! decrement operations used by the UI.
//!
//! # Architecture
//!
//! - [`CartStore`] owns the canonical list of cart lines
//! - [`persist`] writes snapshots in the background through a depth-1,
//!   latest-wins queue so mutations never wait on storage
//! - [`storage`] provides the [`KeyValueStore`] trait plus memory and file
//!   backends
//! - [`CartProvider`] scopes a store's lifetime; using the cart outside an
//!   active provider is a [`CartError::NotInitialized`]
//!
//! # Example
//!
//! ```rust,no_run
//! use go_marketplace_cart::{CartConfig, CartProvider, MemoryStore};
//! use go_marketplace_core::{CartProduct, Price, ProductId};
//!
//! # async fn run() -> go_marketplace_cart::Result<()> {
//! let mut provider = CartProvider::new();
//! provider.mount(MemoryStore::new(), &CartConfig::default()).await;
//!
//! let cart = provider.cart()?;
//! let id = ProductId::parse("p1").expect("valid id");
//! cart.add_to_cart(CartProduct::new(id.clone(), "Shirt", "https://cdn/shirt.png", Price::from_cents(1000)));
//! cart.increment(&id);
//!
//! provider.unmount().await;
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod persist;
pub mod provider;
pub mod storage;
pub mod store;

pub use config::{CartConfig, ConfigError};
pub use error::{CartError, Result};
pub use provider::CartProvider;
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use store::CartStore;
