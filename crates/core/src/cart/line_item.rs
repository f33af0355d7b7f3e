//! Cart line items and their identity key.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::product::normalize_variant;
use crate::types::{Price, ProductId};

/// One entry in a cart: a product/variant pair and its quantity.
///
/// This is also the persisted shape, so field names follow the camelCase
/// layout browsers already store under the cart key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    pub id: ProductId,
    #[serde(default)]
    pub name: String,
    pub price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_color: Option<String>,
    pub quantity: u32,
}

impl CartLineItem {
    /// Whether this line has the given identity key.
    #[must_use]
    pub fn matches(&self, key: &LineKey) -> bool {
        self.id == key.id
            && self.selected_size == key.selected_size
            && self.selected_color == key.selected_color
    }

    /// The identity key of this line.
    #[must_use]
    pub fn key(&self) -> LineKey {
        LineKey::from_parts(
            self.id.clone(),
            self.selected_size.clone(),
            self.selected_color.clone(),
        )
    }

    /// `price * quantity` for this line.
    ///
    /// Lines held by a [`Cart`](super::Cart) never overflow; a hand-built line
    /// that does saturates instead of panicking.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price.times(self.quantity)
    }

    /// `price * quantity`, or `None` on overflow.
    #[must_use]
    pub fn checked_line_total(&self) -> Option<Decimal> {
        self.price.checked_times(self.quantity)
    }

    /// Replace blank variant strings with "no variant".
    pub(crate) fn normalize_variants(&mut self) {
        self.selected_size = normalize_variant(self.selected_size.take());
        self.selected_color = normalize_variant(self.selected_color.take());
    }
}

/// The `(id, selectedSize, selectedColor)` triple identifying a line item.
///
/// Deserializable on its own so remove/update requests only need to carry the
/// key, not the whole product.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineKey {
    pub id: ProductId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_color: Option<String>,
}

impl LineKey {
    /// Key for a product with no variant selected.
    #[must_use]
    pub fn new(id: impl Into<ProductId>) -> Self {
        Self {
            id: id.into(),
            selected_size: None,
            selected_color: None,
        }
    }

    /// Key from raw parts. Blank variant strings mean "no variant".
    #[must_use]
    pub fn from_parts(
        id: impl Into<ProductId>,
        selected_size: Option<String>,
        selected_color: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            selected_size: normalize_variant(selected_size),
            selected_color: normalize_variant(selected_color),
        }
    }

    #[must_use]
    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.selected_size = normalize_variant(Some(size.into()));
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.selected_color = normalize_variant(Some(color.into()));
        self
    }

    /// Apply the same blank-means-absent rule products get.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self::from_parts(self.id, self.selected_size, self.selected_color)
    }
}
