//! # Domain Types
//!
//! Core domain types used throughout Dukkan POS.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │    SaleItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │◄──┤  customer_id?   │◄──┤  sale_id (FK)   │       │
//! │  │  code (unique)  │   │  user_id        │   │  product_id(FK) │       │
//! │  │  price_cents    │   │  subtotal/tax/  │   │  code/name snap │       │
//! │  │  quantity       │   │  discount/total │   │  qty × price    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Customer     │   │      User       │   │    Expense      │       │
//! │  │  name, phone?   │   │  username, role │   │  amount, cat.   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every entity carries a UUID v4 `id` generated by the application. Products
//! also carry a human-facing `code` (unique) that the cashier types or scans.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate in basis points (1 bps = 0.01%).
///
/// The settings table stores the rate as a percentage string (`"15"`,
/// `"7.5"`); [`TaxRate::parse_percent`] converts it without going through
/// floating point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Upper bound: 100%.
    pub const MAX_BPS: u32 = 10_000;

    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Parses a percentage with at most two decimals (`"15"` → 1500 bps,
    /// `"8.25"` → 825 bps).
    ///
    /// ```rust
    /// use dukkan_core::types::TaxRate;
    ///
    /// assert_eq!(TaxRate::parse_percent("15").unwrap().bps(), 1_500);
    /// assert_eq!(TaxRate::parse_percent(" 7.5 ").unwrap().bps(), 750);
    /// assert!(TaxRate::parse_percent("abc").is_err());
    /// assert!(TaxRate::parse_percent("101").is_err());
    /// ```
    pub fn parse_percent(s: &str) -> Result<Self, ValidationError> {
        let s = s.trim();
        let bad = |reason: &str| ValidationError::invalid_format("tax_rate", reason);

        if s.is_empty() {
            return Err(ValidationError::required("tax_rate"));
        }

        let (whole, frac) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };

        if whole.is_empty() || !whole.chars().all(|c| c.is_ascii_digit()) {
            return Err(bad("expected a non-negative percentage such as 15 or 7.5"));
        }
        if frac.len() > 2 || !frac.chars().all(|c| c.is_ascii_digit()) {
            return Err(bad("at most two decimal places are allowed"));
        }

        let whole: u32 = whole
            .parse()
            .map_err(|_| bad("percentage is too large"))?;
        let frac_bps: u32 = match frac.len() {
            0 => 0,
            1 => frac.parse::<u32>().unwrap_or(0) * 10,
            _ => frac.parse::<u32>().unwrap_or(0),
        };

        let bps = whole
            .checked_mul(100)
            .and_then(|w| w.checked_add(frac_bps))
            .filter(|bps| *bps <= Self::MAX_BPS)
            .ok_or(ValidationError::OutOfRange {
                field: "tax_rate".to_string(),
                min: 0,
                max: 100,
            })?;

        Ok(TaxRate(bps))
    }
}

/// Renders as the percentage string stored in settings (`"15"`, `"8.25"`).
impl fmt::Display for TaxRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / 100;
        let frac = self.0 % 100;
        match frac {
            0 => write!(f, "{}", whole),
            f2 if f2 % 10 == 0 => write!(f, "{}.{}", whole, f2 / 10),
            f2 => write!(f, "{}.{:02}", whole, f2),
        }
    }
}

// =============================================================================
// Role
// =============================================================================

/// Operator role. Admins may do everything; see [`crate::access`] for the
/// cashier's capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    Admin,
    Cashier,
}

impl Role {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Cashier => "cashier",
        }
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "cashier" => Ok(Role::Cashier),
            _ => Err(ValidationError::NotAllowed {
                field: "role".to_string(),
                allowed: vec!["admin".to_string(), "cashier".to_string()],
            }),
        }
    }
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum PaymentMethod {
    /// Physical cash.
    #[default]
    Cash,
    /// Card on an external terminal.
    Card,
}

// =============================================================================
// Product
// =============================================================================

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    pub id: String,

    /// Business identifier typed or scanned at the till. Unique.
    pub code: String,

    pub name: String,
    pub description: Option<String>,

    /// Selling price in minor units.
    pub price_cents: i64,

    /// Purchase cost in minor units.
    pub cost_cents: i64,

    /// On-hand quantity. Never negative.
    pub quantity: i64,

    pub category: Option<String>,
    pub image_path: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Whether `requested` units can be taken from on-hand stock.
    pub fn has_stock_for(&self, requested: i64) -> bool {
        requested <= self.quantity
    }
}

/// Fields supplied when creating or updating a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductInput {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price_cents: i64,
    #[serde(default)]
    pub cost_cents: i64,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image_path: Option<String>,
}

// =============================================================================
// Customer
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CustomerInput {
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

// =============================================================================
// Users & Sessions
// =============================================================================

/// A stored operator account.
///
/// `password_hash` is an argon2 PHC string. It is never serialized.
#[derive(Debug, Clone, Serialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(skip)]
    #[ts(skip)]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "password"))]
    pub password_hash: String,
    pub role: Role,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// What a successful login yields and what the session remembers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AuthenticatedUser {
    pub id: String,
    pub username: String,
    pub role: Role,
}

impl From<&User> for AuthenticatedUser {
    fn from(user: &User) -> Self {
        AuthenticatedUser {
            id: user.id.clone(),
            username: user.username.clone(),
            role: user.role,
        }
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A recorded sale header. Immutable once written.
///
/// `total_cents == subtotal_cents + tax_cents - discount_cents`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Sale {
    pub id: String,
    pub customer_id: Option<String>,
    pub user_id: String,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub payment_method: PaymentMethod,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Sale {
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// One line of a recorded sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    /// Product code at the time of sale.
    pub code_snapshot: String,
    /// Product name at the time of sale.
    pub name_snapshot: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl SaleItem {
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.unit_price_cents).multiply_quantity(self.quantity)
    }
}

/// A sale header together with its lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleWithItems {
    pub sale: Sale,
    pub items: Vec<SaleItem>,
}

// =============================================================================
// Expense
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Expense {
    pub id: String,
    pub description: String,
    pub amount_cents: i64,
    pub category: String,
    pub user_id: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ExpenseInput {
    pub description: String,
    pub amount_cents: i64,
    pub category: String,
}

// =============================================================================
// Unit Tests
// =============================================================================
