//! Campus Market Storefront library.
//!
//! This crate provides the cart service as a library, allowing it to be
//! tested and reused by the CLI.
//!
//! # Modules
//!
//! - [`cart`] - Cart store, persistence port, storage backends, session registry
//! - [`config`] - Environment configuration
//! - [`routes`] - HTTP handlers and the assembled [`routes::app`]

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
