//! Cart errors.

use rust_decimal::Decimal;

use crate::types::ProductId;

/// Errors raised by cart validation and mutation.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    /// The product has no identifier.
    #[error("product id is required")]
    MissingId,
    /// The product has no price.
    #[error("product price is required")]
    MissingPrice,
    /// The product price is below zero.
    #[error("product price cannot be negative (got {0})")]
    NegativePrice(Decimal),
    /// Items are added in quantities of at least one.
    #[error("quantity must be at least 1")]
    InvalidQuantity,
    /// Adding would overflow the line item's quantity.
    #[error("quantity for product {0} is too large")]
    QuantityOverflow(ProductId),
    /// The change would push a line or cart total past the largest amount.
    #[error("cart total would be too large after changing product {0}")]
    TotalOverflow(ProductId),
}
