//! Cart persistence port.
//!
//! [`CartPersistence`] is what a [`CartStore`](super::CartStore) talks to.
//! [`JsonCartPersistence`] implements it over any [`KeyValueStorage`] by
//! writing the whole collection as one JSON array under a single key.

use campus_market_core::CartLineItem;
use thiserror::Error;

use super::storage::{KeyValueStorage, StorageError};

/// Storage key for a cart that is not scoped to a session.
pub const CART_STORAGE_KEY: &str = "cart";

/// Errors from loading or saving a cart.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The stored value is not a JSON array of line items.
    #[error("persisted cart is corrupt: {0}")]
    Corrupt(#[source] serde_json::Error),

    #[error("failed to encode cart: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Load and save a cart's line items as a whole.
pub trait CartPersistence: Send + Sync {
    /// Read the persisted line items. A cart that was never saved is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails or the stored data is corrupt.
    fn load(&self) -> Result<Vec<CartLineItem>, PersistenceError>;

    /// Overwrite the persisted line items.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or the backend fails.
    fn save(&self, items: &[CartLineItem]) -> Result<(), PersistenceError>;
}

/// JSON-array persistence under one storage key.
#[derive(Debug, Clone)]
pub struct JsonCartPersistence<S> {
    storage: S,
    key: String,
}

impl<S: KeyValueStorage> JsonCartPersistence<S> {
    /// Persist under `key` in `storage`.
    #[must_use]
    pub fn new(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// Persist under [`CART_STORAGE_KEY`].
    #[must_use]
    pub fn with_default_key(storage: S) -> Self {
        Self::new(storage, CART_STORAGE_KEY)
    }

    /// The storage key in use.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Remove the persisted value entirely.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    pub fn delete(&self) -> Result<(), PersistenceError> {
        Ok(self.storage.remove(&self.key)?)
    }
}

impl<S: KeyValueStorage> CartPersistence for JsonCartPersistence<S> {
    fn load(&self) -> Result<Vec<CartLineItem>, PersistenceError> {
        match self.storage.get(&self.key)? {
            Some(raw) => serde_json::from_str(&raw).map_err(PersistenceError::Corrupt),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, items: &[CartLineItem]) -> Result<(), PersistenceError> {
        let raw = serde_json::to_string(items).map_err(PersistenceError::Encode)?;
        self.storage.set(&self.key, &raw)?;
        Ok(())
    }
}
