//! # Money Module
//!
//! The `Money` type: every price, tax, discount and total in Dukkan POS.
//!
//! ## Integer Minor Units
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Floating point:   0.1 + 0.2 = 0.30000000000000004                     │
//! │                                                                         │
//! │  Minor units:      10 + 20 = 30 halalas (0.30 SAR), exactly            │
//! │                                                                         │
//! │  The only rounding step in a sale is the tax line, and it happens      │
//! │  exactly once, in `Money::calculate_tax`.                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use dukkan_core::money::Money;
//!
//! let price = Money::from_cents(299_999); // 2999.99
//! let line = price * 2i64;
//! assert_eq!(line.cents(), 599_998);
//! assert_eq!(line.to_string(), "5999.98");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary amount in minor units (cents / halalas).
///
/// Signed so that intermediate values such as `subtotal - discount` never
/// wrap; stored amounts are validated non-negative before they reach the
/// database.
///
/// ```text
/// Product.price_cents ──► CartLine.unit_price_cents ──► line total
///                                                          │
///                                   Σ line totals ◄────────┘
///                                        │
///                             subtotal ──┼──► calculate_tax ──► tax
///                                        ▼
///                         total = subtotal + tax − discount
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// ```rust
    /// use dukkan_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_minor(99, 99).cents(), 9_999);
    /// assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    /// ```
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the amount in minor units.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Whole major units, truncated toward zero.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Minor-unit remainder, always 0..=99.
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Applies a flat tax rate, rounding half-up to the nearest minor unit.
    ///
    /// ## Rounding
    /// `(amount × bps + 5000) / 10000` in i128. Half a minor unit always
    /// rounds away from zero for the non-negative amounts a sale produces.
    ///
    /// ```rust
    /// use dukkan_core::money::Money;
    /// use dukkan_core::types::TaxRate;
    ///
    /// // 250.00 at 15% → 37.50
    /// let tax = Money::from_cents(25_000).calculate_tax(TaxRate::from_bps(1_500));
    /// assert_eq!(tax.cents(), 3_750);
    ///
    /// // 0.03 at 15% = 0.0045 → 0.00; 0.10 at 15% = 0.015 → 0.02
    /// assert_eq!(Money::from_cents(3).calculate_tax(TaxRate::from_bps(1_500)).cents(), 0);
    /// assert_eq!(Money::from_cents(10).calculate_tax(TaxRate::from_bps(1_500)).cents(), 2);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        let tax_cents = (self.0 as i128 * rate.bps() as i128 + 5_000) / 10_000;
        Money::from_cents(tax_cents as i64)
    }

    /// Line total for `qty` units at this unit price, or `None` on overflow.
    ///
    /// ```rust
    /// use dukkan_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(299).checked_multiply_quantity(3), Some(Money::from_cents(897)));
    /// assert_eq!(Money::from_cents(10_000).checked_multiply_quantity(i64::MAX / 2), None);
    /// ```
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Line total for already-recorded lines. Saturates instead of wrapping;
    /// carts go through [`Money::checked_multiply_quantity`].
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain decimal rendering (`"267.50"`). Currency symbols and localized
/// digits are the UI's job.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
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

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl From<i64> for Money {
    fn from(cents: i64) -> Self {
        Money(cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
