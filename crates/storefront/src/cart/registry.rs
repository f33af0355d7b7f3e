//! Session cart registry.
//!
//! Keeps hydrated [`CartStore`]s in a moka cache keyed by [`CartToken`]. A cart
//! idle past the configured timeout is evicted; its state is already persisted,
//! so the next request simply hydrates it again.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

use super::persistence::JsonCartPersistence;
use super::storage::KeyValueStorage;
use super::store::CartStore;
use super::token::CartToken;

/// Storage shared by every session cart.
pub type SharedStorage = Arc<dyn KeyValueStorage>;

/// A cart store bound to one session's storage key.
pub type SessionCartStore = CartStore<JsonCartPersistence<SharedStorage>>;

/// Handle to a session cart. Lock it for the duration of one operation.
pub type SessionCart = Arc<Mutex<SessionCartStore>>;

/// Loading a cart from storage could not complete.
#[derive(Debug, Clone, Error)]
#[error("cart hydration failed: {0}")]
pub struct HydrationError(String);

/// Registry of hydrated session carts.
///
/// Cheaply cloneable; clones share the cache and storage.
#[derive(Clone)]
pub struct CartRegistry {
    storage: SharedStorage,
    carts: Cache<CartToken, SessionCart>,
}

impl CartRegistry {
    /// Create a registry over `storage`.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum number of carts kept hydrated
    /// * `idle` - Evict carts not accessed for this long
    #[must_use]
    pub fn new(storage: SharedStorage, capacity: u64, idle: Duration) -> Self {
        let carts = Cache::builder()
            .max_capacity(capacity)
            .time_to_idle(idle)
            .build();
        Self { storage, carts }
    }

    /// Get the cart for `token`, hydrating it from storage on first access.
    ///
    /// Concurrent first accesses for the same token share one hydration,
    /// which reads storage on the blocking pool.
    ///
    /// # Errors
    ///
    /// Returns an error if the hydration task panicked or was cancelled.
    /// Storage failures are not errors: the cart starts empty.
    pub async fn cart(&self, token: CartToken) -> Result<SessionCart, HydrationError> {
        let storage = Arc::clone(&self.storage);
        self.carts
            .try_get_with(token, async move {
                debug!(%token, "Hydrating session cart");
                let persistence = JsonCartPersistence::new(storage, token.storage_key());
                tokio::task::spawn_blocking(move || CartStore::hydrate(persistence))
                    .await
                    .map(|store| Arc::new(Mutex::new(store)))
                    .map_err(|e| HydrationError(e.to_string()))
            })
            .await
            .map_err(|e| (*e).clone())
    }

    /// The underlying storage.
    #[must_use]
    pub const fn storage(&self) -> &SharedStorage {
        &self.storage
    }

    /// Number of carts currently hydrated (approximate).
    #[must_use]
    pub fn hydrated_count(&self) -> u64 {
        self.carts.entry_count()
    }
}
