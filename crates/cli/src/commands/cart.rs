//! Persisted cart maintenance commands.
//!
//! # Usage
//!
//! ```bash
//! # List every persisted cart
//! cm-cli cart list
//!
//! # Show one cart
//! cm-cli cart show cart-0b6c5f0e-1c1e-4a59-9d7f-5f1c3c1d2f10
//!
//! # Add two medium hoodies
//! cm-cli cart add cart-0b6c... --id 12 --price 1500 --name "Hoodie" --size M --quantity 2
//!
//! # Clear a cart
//! cm-cli cart clear cart-0b6c...
//! ```
//!
//! # Environment Variables
//!
//! - `CART_DATA_DIR` - Cart storage directory (default: data/carts)
//! - `CART_CURRENCY` - Currency used to format totals (default: KES)

use campus_market_core::{CartError, CartProduct, CurrencyCode, LineKey, ProductId};
use campus_market_storefront::cart::{
    CartStore, JsonCartPersistence, KeyValueStorage, StorageError,
};
use campus_market_storefront::middleware::is_session_key;
use thiserror::Error;
use tracing::info;

/// Errors that can occur during cart commands.
#[derive(Debug, Error)]
pub enum CartCommandError {
    /// Storage backend failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Cart rejected the change.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Nothing is stored under the key.
    #[error("No cart stored under key: {0}")]
    NotFound(String),

    /// The key exists but names no matching line.
    #[error("No line {0} in cart {1}")]
    LineNotFound(String, String),
}

/// Parse a product ID argument: integers become numeric IDs, anything else text.
#[allow(clippy::unnecessary_wraps)]
pub fn parse_product_id(value: &str) -> Result<ProductId, std::convert::Infallible> {
    Ok(value
        .parse::<i64>()
        .map_or_else(|_| ProductId::from(value), ProductId::from))
}

/// Build a line key from command arguments.
#[must_use]
pub fn line_key(id: ProductId, size: Option<String>, color: Option<String>) -> LineKey {
    LineKey::from_parts(id, size, color)
}

fn describe(key: &LineKey) -> String {
    let mut out = key.id.to_string();
    if let Some(size) = &key.selected_size {
        out.push_str(&format!(" size={size}"));
    }
    if let Some(color) = &key.selected_color {
        out.push_str(&format!(" color={color}"));
    }
    out
}

fn open<S: KeyValueStorage>(storage: S, key: &str) -> CartStore<JsonCartPersistence<S>> {
    CartStore::hydrate(JsonCartPersistence::new(storage, key))
}

fn open_existing<S: KeyValueStorage>(
    storage: S,
    key: &str,
) -> Result<CartStore<JsonCartPersistence<S>>, CartCommandError> {
    if storage.get(key)?.is_none() {
        return Err(CartCommandError::NotFound(key.to_owned()));
    }
    Ok(open(storage, key))
}

/// Log a summary line for every persisted cart. Session records are skipped.
///
/// # Errors
///
/// Returns an error if the storage cannot be listed.
pub fn list<S: KeyValueStorage + Clone>(
    storage: &S,
    currency: CurrencyCode,
) -> Result<usize, CartCommandError> {
    let keys: Vec<String> = storage
        .keys()?
        .into_iter()
        .filter(|key| !is_session_key(key))
        .collect();
    for key in &keys {
        let store = open(storage.clone(), key);
        info!(
            key = %key,
            lines = store.items().len(),
            items = store.item_count(),
            total = %currency.format(store.total()),
            "cart"
        );
    }
    info!("{} cart(s)", keys.len());
    Ok(keys.len())
}

/// Log every line of one cart.
///
/// # Errors
///
/// Returns an error if the cart does not exist or storage fails.
pub fn show<S: KeyValueStorage>(
    storage: S,
    key: &str,
    currency: CurrencyCode,
) -> Result<(), CartCommandError> {
    let store = open_existing(storage, key)?;
    for item in store.items() {
        info!(
            line = %describe(&item.key()),
            name = %item.name,
            price = %item.price,
            quantity = item.quantity,
            subtotal = %currency.format(item.line_total()),
        );
    }
    info!(
        "{} item(s), total {}",
        store.item_count(),
        currency.format(store.total())
    );
    Ok(())
}

/// Add a product to a cart, creating the cart if needed.
///
/// # Errors
///
/// Returns an error if the cart rejects the product or storage fails.
pub fn add<S: KeyValueStorage>(
    storage: S,
    key: &str,
    product: CartProduct,
    quantity: u32,
) -> Result<(), CartCommandError> {
    // Reject bad keys up front; the store would only log the failed write.
    storage.get(key)?;

    let line = describe(&product.key());
    let mut store = open(storage, key);
    store.add_to_cart(product, quantity)?;
    info!(key, line = %line, quantity, "Added to cart");
    Ok(())
}

/// Set the quantity of a line. Quantities below one change nothing.
///
/// # Errors
///
/// Returns an error if the cart or line does not exist, the new quantity
/// would overflow the total, or storage fails.
pub fn update<S: KeyValueStorage>(
    storage: S,
    key: &str,
    line: &LineKey,
    quantity: u32,
) -> Result<(), CartCommandError> {
    let mut store = open_existing(storage, key)?;
    if store.cart().get(line).is_none() {
        return Err(CartCommandError::LineNotFound(describe(line), key.to_owned()));
    }
    if store.update_quantity(line, quantity)? {
        info!(key, line = %describe(line), quantity, "Updated quantity");
    } else {
        info!(key, line = %describe(line), quantity, "Quantity unchanged");
    }
    Ok(())
}

/// Remove a line from a cart.
///
/// # Errors
///
/// Returns an error if the cart or line does not exist, or storage fails.
pub fn remove<S: KeyValueStorage>(
    storage: S,
    key: &str,
    line: &LineKey,
) -> Result<(), CartCommandError> {
    let mut store = open_existing(storage, key)?;
    if !store.remove_from_cart(line) {
        return Err(CartCommandError::LineNotFound(describe(line), key.to_owned()));
    }
    info!(key, line = %describe(line), "Removed from cart");
    Ok(())
}

/// Empty a cart.
///
/// # Errors
///
/// Returns an error if the cart does not exist or storage fails.
pub fn clear<S: KeyValueStorage>(storage: S, key: &str) -> Result<(), CartCommandError> {
    let mut store = open_existing(storage, key)?;
    store.clear_cart();
    info!(key, "Cleared cart");
    Ok(())
}
