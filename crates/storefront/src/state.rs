//! Application state shared across handlers.

use std::sync::Arc;

use crate::cart::{CartRegistry, FileStorage, MemoryStorage, SharedStorage, StorageError};
use crate::config::{CartStorageConfig, StorefrontConfig};
use crate::middleware::StorageSessionStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the configuration, the session cart registry and the session store.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    carts: CartRegistry,
    sessions: StorageSessionStore,
}

impl AppState {
    /// Create application state with the storage backend named in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file storage directory cannot be created.
    pub fn new(config: StorefrontConfig) -> Result<Self, StorageError> {
        let storage: SharedStorage = match &config.cart_storage {
            CartStorageConfig::Memory => Arc::new(MemoryStorage::new()),
            CartStorageConfig::File(dir) => Arc::new(FileStorage::open(dir)?),
        };
        Ok(Self::with_storage(config, storage))
    }

    /// Create application state over an explicit storage backend.
    #[must_use]
    pub fn with_storage(config: StorefrontConfig, storage: SharedStorage) -> Self {
        let sessions = StorageSessionStore::new(Arc::clone(&storage));
        let carts = CartRegistry::new(
            storage,
            config.cart_cache_capacity,
            config.cart_idle_timeout,
        );
        Self {
            inner: Arc::new(AppStateInner {
                config,
                carts,
                sessions,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the session cart registry.
    #[must_use]
    pub fn carts(&self) -> &CartRegistry {
        &self.inner.carts
    }

    /// Get a reference to the session store.
    #[must_use]
    pub fn sessions(&self) -> &StorageSessionStore {
        &self.inner.sessions
    }
}
