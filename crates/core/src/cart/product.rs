//! Validated cart product input.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::CartError;
use super::line_item::LineKey;
use crate::types::{Price, ProductId};

/// Raw product data as submitted by a client.
///
/// Every field is optional here; use [`CartProduct::try_from`] to validate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CartProductInput {
    pub id: Option<ProductId>,
    pub name: Option<String>,
    #[serde(with = "rust_decimal::serde::arbitrary_precision_option")]
    pub price: Option<Decimal>,
    pub image: Option<String>,
    pub selected_size: Option<String>,
    pub selected_color: Option<String>,
}

/// A product that can be added to a cart.
///
/// Construction guarantees a non-blank `id` and a non-negative `price`.
/// Blank variant strings are normalized to "no variant".
///
/// # Example
///
/// ```rust
/// # use campus_market_core::{CartProduct, CartProductInput, CartError, Price, ProductId};
/// let hoodie = CartProduct::new(ProductId::from(5), Price::from(1200))
///     .with_name("Campus Hoodie")
///     .with_size("M");
/// assert_eq!(hoodie.selected_size(), Some("M"));
///
/// let missing_id = CartProductInput::default();
/// assert_eq!(CartProduct::try_from(missing_id), Err(CartError::MissingId));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartProduct {
    id: ProductId,
    name: String,
    price: Price,
    image: Option<String>,
    selected_size: Option<String>,
    selected_color: Option<String>,
}

impl CartProduct {
    /// Create a product with no display attributes and no variant.
    #[must_use]
    pub const fn new(id: ProductId, price: Price) -> Self {
        Self {
            id,
            name: String::new(),
            price,
            image: None,
            selected_size: None,
            selected_color: None,
        }
    }

    /// Set the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the display image URL.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Select a size variant.
    #[must_use]
    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.selected_size = normalize_variant(Some(size.into()));
        self
    }

    /// Select a color variant.
    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.selected_color = normalize_variant(Some(color.into()));
        self
    }

    #[must_use]
    pub const fn id(&self) -> &ProductId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn price(&self) -> Price {
        self.price
    }

    #[must_use]
    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    #[must_use]
    pub fn selected_size(&self) -> Option<&str> {
        self.selected_size.as_deref()
    }

    #[must_use]
    pub fn selected_color(&self) -> Option<&str> {
        self.selected_color.as_deref()
    }

    /// The identity key a line item for this product would have.
    #[must_use]
    pub fn key(&self) -> LineKey {
        LineKey::from_parts(
            self.id.clone(),
            self.selected_size.clone(),
            self.selected_color.clone(),
        )
    }

    pub(crate) fn into_parts(
        self,
    ) -> (
        ProductId,
        String,
        Price,
        Option<String>,
        Option<String>,
        Option<String>,
    ) {
        (
            self.id,
            self.name,
            self.price,
            self.image,
            self.selected_size,
            self.selected_color,
        )
    }
}

impl TryFrom<CartProductInput> for CartProduct {
    type Error = CartError;

    fn try_from(input: CartProductInput) -> Result<Self, Self::Error> {
        let id = input
            .id
            .filter(|id| !id.is_blank())
            .ok_or(CartError::MissingId)?;
        let price = Price::new(input.price.ok_or(CartError::MissingPrice)?);
        if price.is_negative() {
            return Err(CartError::NegativePrice(price.amount()));
        }

        Ok(Self {
            id,
            name: input.name.unwrap_or_default(),
            price,
            image: input.image.filter(|s| !s.trim().is_empty()),
            selected_size: normalize_variant(input.selected_size),
            selected_color: normalize_variant(input.selected_color),
        })
    }
}

/// Blank variant strings mean "no variant".
pub(crate) fn normalize_variant(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn input_json(json: &str) -> CartProductInput {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_valid_input() {
        let product = CartProduct::try_from(input_json(
            r#"{"id": 1, "name": "Mug", "price": 500, "selectedColor": "red"}"#,
        ))
        .unwrap();

        assert_eq!(product.id(), &ProductId::Number(1));
        assert_eq!(product.name(), "Mug");
        assert_eq!(product.price(), Price::from(500));
        assert_eq!(product.selected_size(), None);
        assert_eq!(product.selected_color(), Some("red"));
    }

    #[test]
    fn test_missing_id() {
        let result = CartProduct::try_from(input_json(r#"{"price": 500}"#));
        assert_eq!(result, Err(CartError::MissingId));
    }

    #[test]
    fn test_blank_id() {
        let result = CartProduct::try_from(input_json(r#"{"id": "  ", "price": 500}"#));
        assert_eq!(result, Err(CartError::MissingId));
    }

    #[test]
    fn test_missing_price() {
        let result = CartProduct::try_from(input_json(r#"{"id": "poster"}"#));
        assert_eq!(result, Err(CartError::MissingPrice));
    }

    #[test]
    fn test_negative_price() {
        let result = CartProduct::try_from(input_json(r#"{"id": 3, "price": -1}"#));
        assert!(matches!(result, Err(CartError::NegativePrice(_))));
    }

    #[test]
    fn test_blank_variants_are_absent() {
        let product = CartProduct::try_from(input_json(
            r#"{"id": 3, "price": 10, "selectedSize": "", "selectedColor": " "}"#,
        ))
        .unwrap();
        assert_eq!(product.key(), LineKey::new(3));
    }

    #[test]
    fn test_key_includes_variants() {
        let product = CartProduct::new(ProductId::from(5), Price::from(100))
            .with_size("L")
            .with_color("blue");
        assert_eq!(product.key(), LineKey::new(5).with_size("L").with_color("blue"));
    }
}
