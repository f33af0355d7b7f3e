//! Per-session cart tokens.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prefix of the storage key for a session cart.
pub const CART_KEY_PREFIX: &str = "cart-";

/// Identifies one shopper's cart. Stored in the session, never shown in URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartToken(Uuid);

impl CartToken {
    /// Generate a fresh random token.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// The storage key holding this cart, e.g. `cart-7f0c...`.
    #[must_use]
    pub fn storage_key(&self) -> String {
        format!("{CART_KEY_PREFIX}{}", self.0.as_hyphenated())
    }

    /// Recover a token from a storage key produced by [`Self::storage_key`].
    #[must_use]
    pub fn from_storage_key(key: &str) -> Option<Self> {
        key.strip_prefix(CART_KEY_PREFIX)?.parse().ok()
    }
}

impl fmt::Display for CartToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.as_hyphenated())
    }
}

impl FromStr for CartToken {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}
