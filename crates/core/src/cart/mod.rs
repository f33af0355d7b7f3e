//! Shopping cart domain.
//!
//! - [`CartProduct`] is the validated input for adding to a cart. Raw request
//!   data arrives as [`CartProductInput`] and is checked on conversion.
//! - [`CartLineItem`] is one entry of a cart; its [`LineKey`] decides whether
//!   two additions merge.
//! - [`Cart`] is the ordered collection and its mutation rules.

pub mod collection;
pub mod error;
pub mod line_item;
pub mod product;

pub use collection::Cart;
pub use error::CartError;
pub use line_item::{CartLineItem, LineKey};
pub use product::{CartProduct, CartProductInput};
