//! Type-safe price representation using decimal arithmetic.

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A unit price.
///
/// The amount is whatever unit the catalogue supplies (shillings, cents, ...);
/// the cart never converts it. Serialized as a plain JSON number, written with
/// every decimal digit, so persisted carts stay readable by other clients and
/// reload exactly.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(#[serde(with = "rust_decimal::serde::arbitrary_precision")] Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Get the decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns `true` if the amount is below zero.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Price of `quantity` units, or `None` if it exceeds [`Decimal::MAX`].
    #[must_use]
    pub fn checked_times(&self, quantity: u32) -> Option<Decimal> {
        self.0.checked_mul(Decimal::from(quantity))
    }

    /// Price of `quantity` units, saturating at the decimal bounds.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Decimal {
        self.0.saturating_mul(Decimal::from(quantity))
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl From<i64> for Price {
    fn from(amount: i64) -> Self {
        Self(Decimal::from(amount))
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// ISO 4217 currency codes the storefront can display totals in.
///
/// Display only: prices carry no currency and are never converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    KES,
    USD,
    EUR,
    GBP,
}

/// Error returned when parsing an unknown currency code.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported currency code: {0}")]
pub struct UnknownCurrency(pub String);

impl CurrencyCode {
    /// The ISO 4217 code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::KES => "KES",
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
        }
    }

    /// Format an amount for display, rounded to two decimal places.
    ///
    /// ```rust
    /// # use campus_market_core::CurrencyCode;
    /// # use rust_decimal::Decimal;
    /// assert_eq!(CurrencyCode::KES.format(Decimal::new(100050, 2)), "KES 1000.50");
    /// assert_eq!(CurrencyCode::USD.format(Decimal::from(3)), "USD 3.00");
    /// ```
    #[must_use]
    pub fn format(&self, amount: Decimal) -> String {
        let rounded = amount.round_dp(2);
        format!("{} {rounded:.2}", self.code())
    }
}

impl FromStr for CurrencyCode {
    type Err = UnknownCurrency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "KES" => Ok(Self::KES),
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            "GBP" => Ok(Self::GBP),
            _ => Err(UnknownCurrency(s.to_owned())),
        }
    }
}
