//! Product identifiers.
//!
//! Products listed in the marketplace come from two sources: merchandise rows
//! with numeric database IDs and student projects with string slugs. A cart
//! line keeps whichever form it was given and serializes it back unchanged.

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize, de};
use serde_json::Value;

/// Identity of the product behind a cart line.
///
/// Serialized untagged, so `1` and `"1"` round-trip as the JSON number and
/// JSON string they started as. The two are distinct identities.
///
/// Deserialization goes through [`Value`] rather than `#[serde(untagged)]`:
/// untagged buffering cannot see arbitrary-precision JSON numbers as integers.
///
/// # Example
///
/// ```rust
/// # use campus_market_core::ProductId;
/// let merch = ProductId::from(42);
/// let project = ProductId::from("campus-navigator");
///
/// assert_eq!(merch.to_string(), "42");
/// assert_eq!(project.to_string(), "campus-navigator");
/// assert_ne!(ProductId::from(1), ProductId::from("1"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum ProductId {
    /// Numeric identifier (merchandise).
    Number(i64),
    /// String identifier (project slugs, external SKUs).
    Text(String),
}

impl ProductId {
    /// Returns `true` if this is a text identifier with no visible characters.
    ///
    /// Blank identifiers are treated as missing during validation.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Number(_) => false,
            Self::Text(s) => s.trim().is_empty(),
        }
    }
}

impl<'de> Deserialize<'de> for ProductId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Number(n) => n
                .as_i64()
                .map(Self::Number)
                .ok_or_else(|| de::Error::custom(format!("product id {n} is not an integer"))),
            Value::String(s) => Ok(Self::Text(s)),
            other => Err(de::Error::custom(format!(
                "product id must be a number or a string, got {other}"
            ))),
        }
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ProductId {
    fn from(id: i64) -> Self {
        Self::Number(id)
    }
}

impl From<i32> for ProductId {
    fn from(id: i32) -> Self {
        Self::Number(i64::from(id))
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        Self::Text(id)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_owned())
    }
}
