//! Cart store, persistence and session registry.
//!
//! # Layers
//!
//! ```text
//! CartRegistry ── one CartStore per session token (moka cache)
//!   CartStore ─── in-memory Cart, writes through after each change
//!     CartPersistence ── load()/save() of the whole collection
//!       KeyValueStorage ── get/set whole values (memory, files)
//! ```

pub mod persistence;
pub mod registry;
pub mod storage;
pub mod store;
pub mod token;

pub use persistence::{CART_STORAGE_KEY, CartPersistence, JsonCartPersistence, PersistenceError};
pub use registry::{CartRegistry, HydrationError, SessionCart, SessionCartStore, SharedStorage};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, StorageError};
pub use store::CartStore;
pub use token::CartToken;
