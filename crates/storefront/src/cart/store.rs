//! The cart store: an in-memory [`Cart`] mirrored to a persistence port.

use campus_market_core::{Cart, CartError, CartLineItem, CartProduct, LineKey};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::persistence::{CartPersistence, PersistenceError};

/// Authoritative cart state for one shopper.
///
/// The in-memory cart is the authority. It is hydrated once from the
/// persistence port and written back after every operation that changes it.
/// Persistence failures are logged and never surfaced; the in-memory state
/// stays correct and the next successful write repairs the mirror.
#[derive(Debug)]
pub struct CartStore<P> {
    cart: Cart,
    persistence: P,
}

impl<P: CartPersistence> CartStore<P> {
    /// Hydrate a store from its persisted state.
    ///
    /// Unreadable or corrupt data yields an empty cart. Loaded data is
    /// normalized (duplicate keys merged, zero quantities dropped).
    pub fn hydrate(persistence: P) -> Self {
        let cart = match persistence.load() {
            Ok(items) => {
                let loaded = items.len();
                let cart = Cart::from_items(items);
                if cart.len() != loaded {
                    warn!(
                        loaded,
                        kept = cart.len(),
                        "Normalized persisted cart with duplicate or empty lines"
                    );
                }
                cart
            }
            Err(PersistenceError::Corrupt(e)) => {
                warn!(error = %e, "Persisted cart is corrupt, starting empty");
                Cart::new()
            }
            Err(e) => {
                warn!(error = %e, "Failed to load persisted cart, starting empty");
                Cart::new()
            }
        };

        debug!(lines = cart.len(), "Cart hydrated");
        Self { cart, persistence }
    }

    /// Add `quantity` units of `product`, merging with an existing line of the
    /// same identity key.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] for a zero quantity,
    /// [`CartError::QuantityOverflow`] if the merged count would overflow and
    /// [`CartError::TotalOverflow`] if the cart total would. Nothing is
    /// persisted on error.
    pub fn add_to_cart(&mut self, product: CartProduct, quantity: u32) -> Result<(), CartError> {
        self.cart.add(product, quantity)?;
        self.persist();
        Ok(())
    }

    /// Remove the line matching `key`. Returns `true` if one was removed.
    pub fn remove_from_cart(&mut self, key: &LineKey) -> bool {
        let removed = self.cart.remove(key);
        if removed {
            self.persist();
        }
        removed
    }

    /// Set the quantity of the line matching `key`.
    ///
    /// Quantities below one are ignored. Returns `Ok(true)` if the cart
    /// changed.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::TotalOverflow`] if the cart total would overflow;
    /// the cart is left unchanged.
    pub fn update_quantity(&mut self, key: &LineKey, quantity: u32) -> Result<bool, CartError> {
        let changed = self.cart.update_quantity(key, quantity)?;
        if changed {
            self.persist();
        }
        Ok(changed)
    }

    /// Remove every line and persist the empty collection.
    pub fn clear_cart(&mut self) {
        self.cart.clear();
        self.persist();
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        self.cart.items()
    }

    /// Sum of `price * quantity`, computed from current state.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.cart.total()
    }

    /// Sum of quantities, computed from current state.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.cart.item_count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cart.is_empty()
    }

    #[must_use]
    pub const fn persistence(&self) -> &P {
        &self.persistence
    }

    fn persist(&self) {
        if let Err(e) = self.persistence.save(self.cart.items()) {
            warn!(error = %e, "Failed to persist cart");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use campus_market_core::{Price, ProductId};

    use super::*;
    use crate::cart::persistence::{CART_STORAGE_KEY, JsonCartPersistence};
    use crate::cart::storage::{KeyValueStorage, MemoryStorage, StorageError};

    /// Persistence double that counts saves and can be told to fail.
    #[derive(Default)]
    struct Recording {
        saves: AtomicUsize,
        fail: bool,
    }

    impl CartPersistence for Arc<Recording> {
        fn load(&self) -> Result<Vec<CartLineItem>, PersistenceError> {
            if self.fail {
                return Err(PersistenceError::Storage(StorageError::Poisoned));
            }
            Ok(Vec::new())
        }

        fn save(&self, _items: &[CartLineItem]) -> Result<(), PersistenceError> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(PersistenceError::Storage(StorageError::Poisoned));
            }
            Ok(())
        }
    }

    fn product(id: i64, price: i64) -> CartProduct {
        CartProduct::new(ProductId::from(id), Price::from(price))
    }

    fn memory_store() -> (Arc<MemoryStorage>, CartStore<JsonCartPersistence<Arc<MemoryStorage>>>) {
        let storage = Arc::new(MemoryStorage::new());
        let store = CartStore::hydrate(JsonCartPersistence::with_default_key(Arc::clone(
            &storage,
        )));
        (storage, store)
    }

    #[test]
    fn test_add_persists_full_collection() {
        let (storage, mut store) = memory_store();
        store.add_to_cart(product(1, 500), 1).unwrap();
        store.add_to_cart(product(1, 500), 1).unwrap();

        let raw = storage.get(CART_STORAGE_KEY).unwrap().unwrap();
        let persisted: Vec<CartLineItem> = serde_json::from_str(&raw).unwrap();
        assert_eq!(persisted.len(), 1);
        assert_eq!(persisted[0].quantity, 2);
        assert_eq!(store.total(), Decimal::from(1000));
    }

    #[test]
    fn test_hydrate_restores_previous_session() {
        let (storage, mut store) = memory_store();
        store.add_to_cart(product(3, 30), 2).unwrap();
        store
            .add_to_cart(product(1, 10).with_size("S").with_name("Tee"), 1)
            .unwrap();

        let reloaded = CartStore::hydrate(JsonCartPersistence::with_default_key(storage));
        assert_eq!(reloaded.cart(), store.cart());
        assert_eq!(reloaded.items()[1].name, "Tee");
    }

    #[test]
    fn test_corrupt_storage_hydrates_empty() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(CART_STORAGE_KEY, "not json at all").unwrap();

        let store = CartStore::hydrate(JsonCartPersistence::with_default_key(storage));
        assert!(store.is_empty());
    }

    #[test]
    fn test_hydrate_normalizes_duplicates() {
        let storage = Arc::new(MemoryStorage::new());
        storage
            .set(
                CART_STORAGE_KEY,
                r#"[{"id": 1, "price": 5, "quantity": 2},
                    {"id": 1, "price": 5, "quantity": 3},
                    {"id": 2, "price": 5, "quantity": 0}]"#,
            )
            .unwrap();

        let store = CartStore::hydrate(JsonCartPersistence::with_default_key(storage));
        assert_eq!(store.items().len(), 1);
        assert_eq!(store.items()[0].quantity, 5);
    }

    #[test]
    fn test_failed_load_and_save_are_swallowed() {
        let recording = Arc::new(Recording {
            fail: true,
            ..Recording::default()
        });
        let mut store = CartStore::hydrate(Arc::clone(&recording));
        assert!(store.is_empty());

        store.add_to_cart(product(1, 10), 1).unwrap();
        assert_eq!(store.item_count(), 1);
        assert_eq!(recording.saves.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_noops_do_not_persist() {
        let recording = Arc::new(Recording::default());
        let mut store = CartStore::hydrate(Arc::clone(&recording));
        store.add_to_cart(product(2, 200), 3).unwrap();
        assert_eq!(recording.saves.load(Ordering::SeqCst), 1);

        assert!(!store.update_quantity(&LineKey::new(2), 0).unwrap());
        assert!(!store.update_quantity(&LineKey::new(9), 4).unwrap());
        assert!(!store.remove_from_cart(&LineKey::new(9)));
        assert_eq!(store.items()[0].quantity, 3);
        assert_eq!(recording.saves.load(Ordering::SeqCst), 1);

        assert!(store.update_quantity(&LineKey::new(2), 5).unwrap());
        assert_eq!(recording.saves.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_rejected_add_does_not_persist() {
        let recording = Arc::new(Recording::default());
        let mut store = CartStore::hydrate(Arc::clone(&recording));
        assert_eq!(
            store.add_to_cart(product(1, 10), 0),
            Err(CartError::InvalidQuantity)
        );
        assert_eq!(recording.saves.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_total_overflow_is_rejected_before_persisting() {
        let (storage, mut store) = memory_store();
        let huge = CartProduct::new(ProductId::from(1), Price::new(Decimal::MAX));

        assert_eq!(
            store.add_to_cart(huge, 10),
            Err(CartError::TotalOverflow(ProductId::from(1)))
        );
        assert_eq!(storage.get(CART_STORAGE_KEY).unwrap(), None);

        store.add_to_cart(product(1, 10), 1).unwrap();
        assert_eq!(store.total(), Decimal::from(10));
    }

    #[test]
    fn test_remove_only_matching_variant() {
        let (_, mut store) = memory_store();
        store.add_to_cart(product(5, 100).with_size("M"), 1).unwrap();
        store.add_to_cart(product(5, 100).with_size("L"), 1).unwrap();

        assert!(store.remove_from_cart(&LineKey::new(5).with_size("M")));
        assert_eq!(store.items().len(), 1);
        assert_eq!(store.items()[0].selected_size.as_deref(), Some("L"));
    }

    #[test]
    fn test_clear_persists_empty_collection() {
        let (storage, mut store) = memory_store();
        store.add_to_cart(product(1, 10), 1).unwrap();
        store.clear_cart();

        assert!(store.is_empty());
        assert_eq!(
            storage.get(CART_STORAGE_KEY).unwrap().as_deref(),
            Some("[]")
        );
    }
}
