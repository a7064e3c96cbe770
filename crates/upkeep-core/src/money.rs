//! # Quantity and Money
//!
//! Decimal value types for stock quantities and unit costs.
//!
//! ## Why Decimal?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    2.3 × 1.1 = 2.5300000000000002  ❌ totalCost drifts                  │
//! │                                                                         │
//! │  Integer cents don't fit either: quantities are fractional              │
//! │  (0.25 m of hose, 1.5 L of oil) with a 0.01 minimum.                   │
//! │                                                                         │
//! │  OUR SOLUTION: base-10 Decimal                                          │
//! │    2.3 × 1.1 = 2.53 exactly, so totalCost == quantity × unitCost       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use rust_decimal::Decimal;
//! use upkeep_core::money::{Money, Quantity};
//!
//! let qty = Quantity::new(Decimal::new(25, 1)); // 2.5
//! let unit = Money::new(Decimal::new(1099, 2));  // 10.99
//!
//! assert_eq!((qty * unit).amount(), Decimal::new(27475, 3)); // 27.475
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

// =============================================================================
// Quantity
// =============================================================================

/// A stock quantity (units, metres, litres...).
///
/// Serialized as a decimal string; accepts JSON numbers and strings on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(Decimal);

impl Quantity {
    /// Wraps a decimal value.
    #[inline]
    pub const fn new(value: Decimal) -> Self {
        Quantity(value)
    }

    /// Creates a whole-unit quantity.
    #[inline]
    pub fn from_units(units: i64) -> Self {
        Quantity(Decimal::from(units))
    }

    /// Zero quantity.
    #[inline]
    pub const fn zero() -> Self {
        Quantity(Decimal::ZERO)
    }

    /// Returns the underlying decimal.
    #[inline]
    pub const fn value(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Subtracts, returning `None` when the result would go below zero.
    ///
    /// ## Example
    /// ```rust
    /// use upkeep_core::money::Quantity;
    ///
    /// let on_hand = Quantity::from_units(5);
    /// assert_eq!(on_hand.checked_take(Quantity::from_units(3)), Some(Quantity::from_units(2)));
    /// assert_eq!(on_hand.checked_take(Quantity::from_units(6)), None);
    /// ```
    pub fn checked_take(&self, requested: Quantity) -> Option<Quantity> {
        let remaining = self.0 - requested.0;
        if remaining.is_sign_negative() && !remaining.is_zero() {
            None
        } else {
            Some(Quantity(remaining))
        }
    }

    /// Line total `self × unit_cost`, or `None` when the product overflows.
    ///
    /// Payload quantities are untrusted, so line totals go through this
    /// rather than the `*` operator.
    ///
    /// ## Example
    /// ```rust
    /// use rust_decimal::Decimal;
    /// use upkeep_core::money::{Money, Quantity};
    ///
    /// let qty = Quantity::from_units(3);
    /// assert_eq!(qty.checked_total(Money::from_cents(490)), Some(Money::from_cents(1470)));
    ///
    /// let huge = Quantity::new(Decimal::MAX);
    /// assert_eq!(huge.checked_total(Money::from_cents(200)), None);
    /// ```
    pub fn checked_total(&self, unit_cost: Money) -> Option<Money> {
        self.0.checked_mul(unit_cost.0).map(Money)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl std::str::FromStr for Quantity {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str_exact(s.trim()).map(Quantity)
    }
}

impl From<Decimal> for Quantity {
    fn from(value: Decimal) -> Self {
        Quantity(value)
    }
}

impl Add for Quantity {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Quantity(self.0 + other.0)
    }
}

impl AddAssign for Quantity {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Quantity {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Quantity(self.0 - other.0)
    }
}

impl SubAssign for Quantity {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

// =============================================================================
// Money
// =============================================================================

/// A monetary amount in the tenant's currency.
///
/// No currency symbol is attached; formatting for display belongs to the
/// client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Wraps a decimal amount.
    #[inline]
    pub const fn new(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Creates money from minor units (cents).
    ///
    /// ## Example
    /// ```rust
    /// use upkeep_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(1099).to_string(), "10.99");
    /// ```
    #[inline]
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, 2))
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    /// Returns the underlying decimal.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Adds, returning `None` on overflow.
    #[inline]
    pub fn checked_add(&self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }
}

/// Shows two decimal places (banker's rounding on the display copy only).
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0.round_dp(2))
    }
}

impl std::str::FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str_exact(s.trim()).map(Money)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Money(amount)
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Line total: quantity × unit cost, exact. Panics on overflow; see
/// [`Quantity::checked_total`].
impl Mul<Money> for Quantity {
    type Output = Money;

    #[inline]
    fn mul(self, unit_cost: Money) -> Money {
        Money(self.0 * unit_cost.0)
    }
}

impl Mul<Quantity> for Money {
    type Output = Money;

    #[inline]
    fn mul(self, qty: Quantity) -> Money {
        Money(self.0 * qty.0)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_line_total_is_exact() {
        // 2.3 × 1.1 drifts in f64, not here
        let total = Quantity::new(dec!(2.3)) * Money::new(dec!(1.1));
        assert_eq!(total.amount(), dec!(2.53));
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::from_cents(1099).to_string(), "10.99");
        assert_eq!(Money::new(dec!(5)).to_string(), "5.00");
        assert_eq!(Money::new(dec!(-5.5)).to_string(), "-5.50");
    }

    #[test]
    fn test_quantity_display_normalizes() {
        assert_eq!(Quantity::new(dec!(2.500)).to_string(), "2.5");
        assert_eq!(Quantity::from_units(10).to_string(), "10");
    }

    #[test]
    fn test_checked_take() {
        let on_hand = Quantity::new(dec!(1.5));
        assert_eq!(on_hand.checked_take(Quantity::new(dec!(1.5))), Some(Quantity::zero()));
        assert_eq!(on_hand.checked_take(Quantity::new(dec!(1.51))), None);
    }

    #[test]
    fn test_checked_total_overflow() {
        let qty = Quantity::new(Decimal::MAX);
        assert_eq!(qty.checked_total(Money::new(dec!(2))), None);
        assert_eq!(qty.checked_total(Money::new(dec!(1))), Some(Money::new(Decimal::MAX)));
        assert_eq!(
            Quantity::new(dec!(2.3)).checked_total(Money::new(dec!(1.1))),
            Some(Money::new(dec!(2.53)))
        );
        assert_eq!(Money::new(Decimal::MAX).checked_add(Money::new(dec!(1))), None);
    }

    #[test]
    fn test_serde_accepts_numbers_and_strings() {
        let from_number: Quantity = serde_json::from_str("2.5").unwrap();
        let from_string: Quantity = serde_json::from_str("\"2.5\"").unwrap();
        assert_eq!(from_number, from_string);
        assert_eq!(serde_json::to_string(&from_number).unwrap(), "\"2.5\"");
    }

    #[test]
    fn test_parse() {
        assert_eq!("12.75".parse::<Money>().unwrap(), Money::new(dec!(12.75)));
        assert!("twelve".parse::<Quantity>().is_err());
    }

    #[test]
    fn test_sum() {
        let total: Money = vec![Money::from_cents(150), Money::from_cents(250)]
            .into_iter()
            .sum();
        assert_eq!(total, Money::from_cents(400));
    }
}
