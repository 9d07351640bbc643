//! Integration tests for the GoMarketplace cart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p go-marketplace-integration-tests
//!
//! # With cart logs
//! RUST_LOG=go_marketplace_cart=debug cargo test -p go-marketplace-integration-tests -- --nocapture
//! ```
//!
//! # Test Categories
//!
//! - `cart_scenarios` - Cart operations against file-backed storage
//! - `cart_persistence` - Hydrate round-trips, storage failures, write ordering
//!
//! This crate's library holds the shared fixtures used by those tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Once};

use go_marketplace_cart::{KeyValueStore, MemoryStore, StorageError};
use go_marketplace_core::{CartProduct, Price, ProductId};

static TRACING: Once = Once::new();

/// Install a test-friendly tracing subscriber once per test binary.
///
/// Honors `RUST_LOG`; defaults to debug output for the cart crate.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "go_marketplace_cart=debug".into());

        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_test_writer()
            .try_init();
    });
}

/// Parse a product ID, panicking on invalid test input.
#[must_use]
pub fn product_id(id: &str) -> ProductId {
    ProductId::parse(id).unwrap_or_else(|e| panic!("invalid test id {id:?}: {e}"))
}

/// A catalog product with a predictable title and image.
#[must_use]
pub fn product(id: &str, cents: i64) -> CartProduct {
    CartProduct::new(
        product_id(id),
        format!("Product {id}"),
        format!("https://cdn.example.com/{id}.png"),
        Price::from_cents(cents),
    )
}

/// Storage whose reads and writes can be switched off to simulate an
/// unavailable disk.
#[derive(Debug, Clone, Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    failing_reads: Arc<AtomicBool>,
    failing_writes: Arc<AtomicBool>,
    failed_writes: Arc<AtomicUsize>,
}

impl FlakyStore {
    /// Create a store with reads and writes enabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent reads fail (`true`) or succeed (`false`).
    pub fn set_failing_reads(&self, failing: bool) {
        self.failing_reads.store(failing, Ordering::SeqCst);
    }

    /// Make subsequent writes fail (`true`) or succeed (`false`).
    pub fn set_failing_writes(&self, failing: bool) {
        self.failing_writes.store(failing, Ordering::SeqCst);
    }

    /// Number of writes rejected so far.
    #[must_use]
    pub fn failed_writes(&self) -> usize {
        self.failed_writes.load(Ordering::SeqCst)
    }

    /// The underlying memory store.
    #[must_use]
    pub const fn inner(&self) -> &MemoryStore {
        &self.inner
    }
}

impl KeyValueStore for FlakyStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        if self.failing_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("simulated outage".to_string()));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
        if self.failing_writes.load(Ordering::SeqCst) {
            self.failed_writes.fetch_add(1, Ordering::SeqCst);
            return Err(StorageError::Unavailable("simulated outage".to_string()));
        }
        self.inner.set(key, value).await
    }
}
