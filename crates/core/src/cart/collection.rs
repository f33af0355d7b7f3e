//! The cart collection.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::CartError;
use super::line_item::{CartLineItem, LineKey};
use super::product::CartProduct;

/// An ordered collection of line items with unique identity keys.
///
/// Mutations report whether the collection changed so callers can decide
/// whether to write it back to storage. Derived values ([`Cart::total`],
/// [`Cart::item_count`]) are recomputed on every call.
///
/// # Example
///
/// ```rust
/// # use campus_market_core::{Cart, CartProduct, LineKey, ProductId, Price};
/// # use rust_decimal::Decimal;
/// let mut cart = Cart::new();
/// let mug = CartProduct::new(ProductId::from(1), Price::from(500));
///
/// cart.add(mug.clone(), 1).unwrap();
/// cart.add(mug, 1).unwrap();
///
/// assert_eq!(cart.len(), 1);
/// assert_eq!(cart.get(&LineKey::new(1)).map(|i| i.quantity), Some(2));
/// assert_eq!(cart.total(), Decimal::from(1000));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartLineItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from items of unknown provenance.
    ///
    /// Blank variants are normalized to "no variant", zero-quantity lines are
    /// dropped, and lines sharing an identity key are merged into the first
    /// occurrence. Lines that would push the total past [`Decimal::MAX`] are
    /// dropped. The result always satisfies the cart invariants.
    #[must_use]
    pub fn from_items(items: impl IntoIterator<Item = CartLineItem>) -> Self {
        let mut cart = Self::new();
        for mut item in items {
            if item.quantity == 0 {
                continue;
            }
            item.normalize_variants();
            let key = item.key();
            if let Some(index) = cart.position(&key) {
                let merged = cart.items[index].quantity.saturating_add(item.quantity);
                cart.try_set_quantity(index, merged).ok();
            } else {
                cart.try_push(item).ok();
            }
        }
        cart
    }

    /// The line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Consume the cart and return its line items.
    #[must_use]
    pub fn into_items(self) -> Vec<CartLineItem> {
        self.items
    }

    /// Number of distinct line items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn position(&self, key: &LineKey) -> Option<usize> {
        self.items.iter().position(|i| i.matches(key))
    }

    /// Sum of line totals, or `None` if any step overflows.
    fn checked_total(&self) -> Option<Decimal> {
        self.items.iter().try_fold(Decimal::ZERO, |sum, item| {
            sum.checked_add(item.checked_line_total()?)
        })
    }

    /// Set a line's quantity, restoring the old one if the total overflows.
    fn try_set_quantity(&mut self, index: usize, quantity: u32) -> Result<(), CartError> {
        let Some(item) = self.items.get_mut(index) else {
            return Ok(());
        };
        let previous = core::mem::replace(&mut item.quantity, quantity);
        if self.checked_total().is_none() {
            if let Some(item) = self.items.get_mut(index) {
                item.quantity = previous;
                return Err(CartError::TotalOverflow(item.id.clone()));
            }
        }
        Ok(())
    }

    /// Append a line, removing it again if the total overflows.
    fn try_push(&mut self, item: CartLineItem) -> Result<(), CartError> {
        self.items.push(item);
        if self.checked_total().is_none() {
            if let Some(item) = self.items.pop() {
                return Err(CartError::TotalOverflow(item.id));
            }
        }
        Ok(())
    }

    /// Look up a line item by identity key.
    #[must_use]
    pub fn get(&self, key: &LineKey) -> Option<&CartLineItem> {
        self.items.iter().find(|i| i.matches(key))
    }

    /// Add `quantity` units of a product.
    ///
    /// Merges into the existing line when the identity key is already present;
    /// the existing line keeps its display attributes. Otherwise appends a new
    /// line. A rejected add leaves the cart unchanged.
    ///
    /// # Errors
    ///
    /// - [`CartError::InvalidQuantity`] if `quantity` is zero
    /// - [`CartError::QuantityOverflow`] if the merged quantity exceeds `u32::MAX`
    /// - [`CartError::TotalOverflow`] if the line or cart total would exceed
    ///   [`Decimal::MAX`]
    pub fn add(&mut self, product: CartProduct, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }

        let key = product.key();
        if let Some(index) = self.position(&key) {
            let merged = self
                .items
                .get(index)
                .and_then(|existing| existing.quantity.checked_add(quantity))
                .ok_or_else(|| CartError::QuantityOverflow(key.id.clone()))?;
            return self.try_set_quantity(index, merged);
        }

        let (id, name, price, image, selected_size, selected_color) = product.into_parts();
        self.try_push(CartLineItem {
            id,
            name,
            price,
            image,
            selected_size,
            selected_color,
            quantity,
        })
    }

    /// Remove the line with the given key. Returns `true` if one was removed.
    pub fn remove(&mut self, key: &LineKey) -> bool {
        let before = self.items.len();
        self.items.retain(|i| !i.matches(key));
        self.items.len() != before
    }

    /// Set the quantity of the line with the given key.
    ///
    /// A quantity below one is ignored; removal goes through [`Cart::remove`].
    /// Returns `Ok(true)` if the stored quantity changed.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::TotalOverflow`] (leaving the cart unchanged) if the
    /// new quantity would push the line or cart total past [`Decimal::MAX`].
    pub fn update_quantity(&mut self, key: &LineKey, quantity: u32) -> Result<bool, CartError> {
        if quantity < 1 {
            return Ok(false);
        }
        match self.position(key) {
            Some(index) if self.items.get(index).is_some_and(|i| i.quantity != quantity) => {
                self.try_set_quantity(index, quantity)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Remove every line. Returns `true` if the cart was non-empty.
    pub fn clear(&mut self) -> bool {
        let changed = !self.items.is_empty();
        self.items.clear();
        changed
    }

    /// Sum of `price * quantity` over all lines.
    ///
    /// Mutations keep this within [`Decimal::MAX`]; a cart deserialized
    /// directly rather than through [`Cart::from_items`] saturates instead of
    /// panicking.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items
            .iter()
            .fold(Decimal::ZERO, |sum, item| sum.saturating_add(item.line_total()))
    }

    /// Sum of quantities over all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }
}
