//! Session-related types.

/// Session keys for storefront data.
pub mod keys {
    /// Key for storing the session's cart token.
    pub const CART_TOKEN: &str = "cart_token";
}
