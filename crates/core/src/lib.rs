//! Campus Market Core - Shared cart types library.
//!
//! This crate provides the types used across all Campus Market components:
//! - `storefront` - Cart HTTP service and persistence
//! - `cli` - Command-line tools for inspecting persisted carts
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no storage
//! access, no HTTP. The cart collection here is the in-memory authority; the
//! storefront crate wraps it with persistence.
//!
//! # Modules
//!
//! - [`types`] - Product identifiers, prices and currencies
//! - [`cart`] - Validated cart products, line items and the cart collection

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod types;

pub use cart::*;
pub use types::*;
