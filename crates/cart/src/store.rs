//! The cart state container.
//!
//! [`CartStore`] owns the canonical, ordered list of cart lines. Each
//! mutation computes the complete new state first, then installs that exact
//! value in memory and hands the same value to the [`PersistQueue`], so what
//! gets written is always the post-mutation cart.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use go_marketplace_core::{CartItem, CartProduct, Price, ProductId, Quantity};
use tracing::{debug, info, instrument};

use crate::config::CartConfig;
use crate::error::{self, CartError};
use crate::persist::{self, PersistQueue};
use crate::storage::KeyValueStore;

/// In-memory cart synchronized to a key-value store.
///
/// Mutations return as soon as the in-memory state is updated; storage
/// writes happen in the background and their failures never reach the
/// caller.
#[derive(Debug)]
pub struct CartStore {
    items: Mutex<Arc<[CartItem]>>,
    queue: PersistQueue,
}

impl CartStore {
    /// Load the persisted cart and start the persistence worker.
    ///
    /// A missing snapshot yields an empty cart. A snapshot that fails to
    /// decode is reported, yields an empty cart, and is overwritten with that
    /// empty cart in the background. A failed read is reported and yields an
    /// empty cart; the next mutation writes it back.
    #[instrument(skip_all, fields(key = %config.storage_key))]
    pub async fn hydrate<S: KeyValueStore>(storage: S, config: &CartConfig) -> Self {
        let mut discarded = false;
        let items = match persist::load(&storage, &config.storage_key).await {
            Ok(Some(items)) => {
                info!(lines = items.len(), "Hydrated cart from storage");
                items
            }
            Ok(None) => {
                debug!("No persisted cart, starting empty");
                Vec::new()
            }
            Err(e) => {
                error::report(&e);
                // A failed read may be transient; only rewrite snapshots known to be bad
                discarded = !matches!(e, CartError::Persistence(_));
                Vec::new()
            }
        };

        let items: Arc<[CartItem]> = items.into();
        let queue = PersistQueue::spawn(
            Arc::new(storage),
            config.storage_key.clone(),
            Arc::clone(&items),
        );

        // Overwrite the bad snapshot right away so storage matches memory
        if discarded {
            queue.submit(Arc::clone(&items));
        }

        Self {
            items: Mutex::new(items),
            queue,
        }
    }

    /// Current cart lines in insertion order.
    ///
    /// Returns a copy; the store can only be changed through its operations.
    #[must_use]
    pub fn items(&self) -> Vec<CartItem> {
        self.lock().to_vec()
    }

    /// A single line, if the product is in the cart.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<CartItem> {
        self.lock().iter().find(|item| &item.id == id).cloned()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lock()
            .iter()
            .map(|item| u64::from(item.quantity.get()))
            .sum()
    }

    /// Sum of `price × quantity` over all lines.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.lock().iter().map(CartItem::line_total).sum()
    }

    /// Add one unit of `product`.
    ///
    /// A product already in the cart gets one more unit and its title, image
    /// and price refreshed from `product`; a new product is appended with a
    /// quantity of one.
    #[instrument(skip_all, fields(product_id = %product.id))]
    pub fn add_to_cart(&self, product: CartProduct) {
        error::add_breadcrumb("add_to_cart", product.id.as_str());
        self.apply(|items| added(items, product));
    }

    /// Add one unit to an existing line. Unknown ids leave the cart
    /// unchanged; the current cart is persisted either way.
    #[instrument(skip(self))]
    pub fn increment(&self, id: &ProductId) {
        error::add_breadcrumb("increment", id.as_str());
        self.apply(|items| incremented(items, id).unwrap_or_else(|| items.to_vec()));
    }

    /// Remove one unit from an existing line, never going below one.
    /// Unknown ids leave the cart unchanged; the current cart is persisted
    /// either way.
    #[instrument(skip(self))]
    pub fn decrement(&self, id: &ProductId) {
        error::add_breadcrumb("decrement", id.as_str());
        self.apply(|items| decremented(items, id).unwrap_or_else(|| items.to_vec()));
    }

    /// Wait until every mutation made so far has been written to storage
    /// (or its write failure has been reported).
    pub async fn flush(&self) {
        self.queue.flush().await;
    }

    /// Write any pending state and stop the persistence worker.
    pub async fn close(self) {
        self.queue.close().await;
    }

    /// Install the state produced by `mutate` and queue it for persistence
    /// while still holding the lock so versions follow mutation order.
    fn apply(&self, mutate: impl FnOnce(&[CartItem]) -> Vec<CartItem>) {
        let mut items = self.lock();
        let next: Arc<[CartItem]> = mutate(&items).into();
        *items = Arc::clone(&next);
        let version = self.queue.submit(next);
        debug!(version, lines = items.len(), "Cart updated");
    }

    fn lock(&self) -> MutexGuard<'_, Arc<[CartItem]>> {
        // Mutations cannot panic halfway through: `apply` swaps in a fully built state
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// State after adding one unit of `product`.
fn added(items: &[CartItem], product: CartProduct) -> Vec<CartItem> {
    let mut next = items.to_vec();
    match next.iter_mut().find(|item| item.id == product.id) {
        Some(existing) => {
            let quantity = existing.quantity.increment();
            *existing = product.into_item(quantity);
        }
        None => next.push(product.into_item(Quantity::ONE)),
    }
    next
}

/// State after incrementing `id`, or `None` if it is not in the cart.
fn incremented(items: &[CartItem], id: &ProductId) -> Option<Vec<CartItem>> {
    update_quantity(items, id, Quantity::increment)
}

/// State after decrementing `id`, or `None` if nothing changes.
fn decremented(items: &[CartItem], id: &ProductId) -> Option<Vec<CartItem>> {
    update_quantity(items, id, Quantity::decrement)
}

fn update_quantity(
    items: &[CartItem],
    id: &ProductId,
    step: fn(Quantity) -> Quantity,
) -> Option<Vec<CartItem>> {
    let position = items.iter().position(|item| &item.id == id)?;
    let mut next = items.to_vec();
    let line = next.get_mut(position)?;
    let quantity = step(line.quantity);
    if quantity == line.quantity {
        return None;
    }
    line.quantity = quantity;
    Some(next)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn id(value: &str) -> ProductId {
        ProductId::parse(value).unwrap()
    }

    fn product(value: &str, cents: i64) -> CartProduct {
        CartProduct::new(id(value), format!("Product {value}"), "u", Price::from_cents(cents))
    }

    fn quantities(store: &CartStore) -> Vec<(String, u32)> {
        store
            .items()
            .into_iter()
            .map(|item| (item.id.into_inner(), item.quantity.get()))
            .collect()
    }

    async fn empty_store() -> (CartStore, MemoryStore) {
        let storage = MemoryStore::new();
        let store = CartStore::hydrate(storage.clone(), &CartConfig::default()).await;
        (store, storage)
    }

    fn persisted(storage: &MemoryStore) -> Vec<CartItem> {
        let bytes = storage
            .get_now(crate::config::DEFAULT_STORAGE_KEY)
            .unwrap()
            .unwrap();
        persist::decode(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_add_new_product_starts_at_one() {
        let (store, _) = empty_store().await;
        store.add_to_cart(product("p1", 1000));
        assert_eq!(quantities(&store), vec![("p1".to_string(), 1)]);
    }

    #[tokio::test]
    async fn test_add_existing_product_increments() {
        let (store, _) = empty_store().await;
        store.add_to_cart(product("p1", 1000));
        store.add_to_cart(product("p1", 1000));
        assert_eq!(quantities(&store), vec![("p1".to_string(), 2)]);
    }

    #[tokio::test]
    async fn test_add_existing_product_refreshes_display_fields() {
        let (store, _) = empty_store().await;
        store.add_to_cart(product("p1", 1000));
        store.add_to_cart(CartProduct::new(id("p1"), "Shirt v2", "u2", Price::from_cents(1200)));

        let line = store.get(&id("p1")).unwrap();
        assert_eq!(line.title, "Shirt v2");
        assert_eq!(line.image_url, "u2");
        assert_eq!(line.price, Price::from_cents(1200));
        assert_eq!(line.quantity.get(), 2);
    }

    #[tokio::test]
    async fn test_add_keeps_ids_unique_and_order_stable() {
        let (store, _) = empty_store().await;
        for value in ["p1", "p2", "p1", "p3", "p2", "p1"] {
            store.add_to_cart(product(value, 100));
        }
        assert_eq!(
            quantities(&store),
            vec![
                ("p1".to_string(), 3),
                ("p2".to_string(), 2),
                ("p3".to_string(), 1),
            ]
        );
    }

    #[tokio::test]
    async fn test_increment_only_touches_target() {
        let (store, _) = empty_store().await;
        store.add_to_cart(product("p1", 100));
        store.add_to_cart(product("p2", 100));
        store.increment(&id("p1"));
        store.increment(&id("p1"));
        assert_eq!(
            quantities(&store),
            vec![("p1".to_string(), 3), ("p2".to_string(), 1)]
        );
    }

    #[tokio::test]
    async fn test_decrement_floors_at_one() {
        let (store, _) = empty_store().await;
        store.add_to_cart(product("p1", 100));
        store.decrement(&id("p1"));
        assert_eq!(quantities(&store), vec![("p1".to_string(), 1)]);
    }

    #[tokio::test]
    async fn test_decrement_reduces_quantity() {
        let (store, _) = empty_store().await;
        store.add_to_cart(product("p1", 100));
        store.increment(&id("p1"));
        store.increment(&id("p1"));
        store.decrement(&id("p1"));
        assert_eq!(quantities(&store), vec![("p1".to_string(), 2)]);
    }

    #[tokio::test]
    async fn test_missing_id_is_noop() {
        let (store, _) = empty_store().await;
        store.add_to_cart(product("p1", 100));
        let before = store.items();

        store.increment(&id("nonexistent"));
        store.decrement(&id("nonexistent"));

        assert_eq!(store.items(), before);
    }

    #[tokio::test]
    async fn test_totals() {
        let (store, _) = empty_store().await;
        assert!(store.is_empty());
        assert_eq!(store.subtotal(), Price::ZERO);

        store.add_to_cart(product("p1", 250));
        store.add_to_cart(product("p1", 250));
        store.add_to_cart(product("p2", 1000));

        assert!(!store.is_empty());
        assert_eq!(store.item_count(), 3);
        assert_eq!(store.subtotal(), Price::from_cents(1500));
    }

    #[tokio::test]
    async fn test_persists_post_mutation_state() {
        let (store, storage) = empty_store().await;

        store.add_to_cart(product("p1", 100));
        store.flush().await;
        assert_eq!(persisted(&storage), store.items());

        store.add_to_cart(product("p1", 100));
        store.flush().await;
        assert_eq!(persisted(&storage), store.items());
        assert_eq!(persisted(&storage)[0].quantity.get(), 2);

        store.decrement(&id("p1"));
        store.flush().await;
        assert_eq!(persisted(&storage), store.items());

        store.close().await;
    }

    #[tokio::test]
    async fn test_hydrate_restores_persisted_cart() {
        let (store, storage) = empty_store().await;
        store.add_to_cart(product("p1", 100));
        store.add_to_cart(product("p2", 200));
        store.increment(&id("p2"));
        let expected = store.items();
        store.close().await;

        let restored = CartStore::hydrate(storage, &CartConfig::default()).await;
        assert_eq!(restored.items(), expected);
    }

    #[tokio::test]
    async fn test_hydrate_discards_malformed_snapshot() {
        let storage = MemoryStore::new();
        storage
            .set_now(crate::config::DEFAULT_STORAGE_KEY, b"{not json".to_vec())
            .unwrap();

        let store = CartStore::hydrate(storage.clone(), &CartConfig::default()).await;
        assert!(store.is_empty());

        store.flush().await;
        assert!(persisted(&storage).is_empty());
    }

    #[tokio::test]
    async fn test_unchanged_quantity_still_persists_current_cart() {
        let storage = MemoryStore::new();
        storage
            .set_now(crate::config::DEFAULT_STORAGE_KEY, b"{garbage".to_vec())
            .unwrap();
        let store = CartStore::hydrate(storage.clone(), &CartConfig::default()).await;

        store.increment(&id("p1"));
        store.decrement(&id("p1"));
        store.flush().await;
        assert_eq!(persisted(&storage), store.items());

        store.add_to_cart(product("p1", 100));
        store.decrement(&id("p1"));
        store.flush().await;
        assert_eq!(persisted(&storage), store.items());
        assert_eq!(persisted(&storage)[0].quantity, Quantity::ONE);

        store.close().await;
    }

    #[tokio::test]
    async fn test_hydrate_accepts_camel_case_snapshot() {
        let storage = MemoryStore::new();
        storage
            .set_now(
                crate::config::DEFAULT_STORAGE_KEY,
                br#"[{"id":"p1","title":"Shirt","imageUrl":"u","price":10,"quantity":4}]"#.to_vec(),
            )
            .unwrap();

        let store = CartStore::hydrate(storage, &CartConfig::default()).await;
        assert_eq!(quantities(&store), vec![("p1".to_string(), 4)]);
    }

    #[test]
    fn test_transitions_return_none_when_unchanged() {
        let items = vec![product("p1", 100).into_item(Quantity::ONE)];
        assert!(incremented(&items, &id("p2")).is_none());
        assert!(decremented(&items, &id("p1")).is_none());
        assert!(decremented(&items, &id("p2")).is_none());
    }
}
