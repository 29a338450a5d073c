//! # Cart & Sale Totals
//!
//! The cart is a plain value the caller owns. The checkout takes it by
//! reference and never mutates it.
//!
//! ## Checkout Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   Cart (value)                                                          │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │   1. subtotal = Σ price × qty          ┐                                │
//! │   2. tax      = subtotal × rate        ├── Cart::totals (this module)   │
//! │   3. total    = subtotal + tax − disc  ┘                                │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │   4. re-read stock, ensure_available   ┐                                │
//! │   5. insert sale + items, decrement    ├── SaleRepository::checkout     │
//! │      COMMIT                            ┘   (dukkan-db, one transaction) │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │   SaleReceipt                                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{PaymentMethod, Product, TaxRate};
use crate::validation::{
    validate_cart_size, validate_non_negative, validate_quantity, ValidationResult,
};

// =============================================================================
// Cart Line
// =============================================================================

/// One product in the cart. The unit price is captured when the product is
/// added and is what the sale records, even if the catalog price changes
/// before checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartLine {
    pub product_id: String,
    pub code: String,
    pub name: String,
    pub unit_price_cents: i64,
    pub quantity: i64,
}

impl CartLine {
    pub fn from_product(product: &Product, quantity: i64) -> Self {
        CartLine {
            product_id: product.id.clone(),
            code: product.code.clone(),
            name: product.name.clone(),
            unit_price_cents: product.price_cents,
            quantity,
        }
    }

    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Unit price × quantity. Fails instead of overflowing.
    pub fn line_total(&self) -> ValidationResult<Money> {
        self.unit_price()
            .checked_multiply_quantity(self.quantity)
            .ok_or_else(|| amount_too_large("line total"))
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The in-progress sale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Cart {
    #[serde(default)]
    pub lines: Vec<CartLine>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub discount_cents: i64,
    #[serde(default)]
    pub customer_id: Option<String>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Adds `quantity` units of a product, merging into an existing line for
    /// the same product.
    ///
    /// Rejects the add when the merged quantity would exceed the product's
    /// on-hand count as of the read the caller made. This is advisory; the
    /// authoritative check happens again at checkout.
    pub fn add_product(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        validate_quantity(quantity)?;

        let existing = self.lines.iter().position(|l| l.product_id == product.id);
        let merged = match existing {
            Some(i) => self.lines[i].quantity.saturating_add(quantity),
            None => {
                validate_cart_size(self.lines.len() + 1)?;
                quantity
            }
        };
        validate_quantity(merged)?;
        ensure_available(product, merged)?;

        match existing {
            Some(i) => self.lines[i].quantity = merged,
            None => self.lines.push(CartLine::from_product(product, quantity)),
        }
        Ok(())
    }

    /// Sets the quantity of an existing line. Zero or less removes it.
    /// Returns false when the product is not in the cart.
    pub fn set_quantity(&mut self, product_id: &str, quantity: i64) -> bool {
        if quantity <= 0 {
            return self.remove_line(product_id);
        }
        match self.lines.iter_mut().find(|l| l.product_id == product_id) {
            Some(line) => {
                line.quantity = quantity;
                true
            }
            None => false,
        }
    }

    pub fn remove_line(&mut self, product_id: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);
        self.lines.len() != before
    }

    pub fn clear(&mut self) {
        *self = Cart::default();
    }

    /// Σ line totals. Fails instead of overflowing.
    pub fn subtotal(&self) -> ValidationResult<Money> {
        self.lines.iter().try_fold(Money::zero(), |acc, line| {
            acc.checked_add(line.line_total()?)
                .ok_or_else(|| amount_too_large("subtotal"))
        })
    }

    /// Total units requested per product, in first-seen order.
    ///
    /// A cart deserialized from the UI may list the same product twice; the
    /// stock check must see the combined demand.
    pub fn requested_quantities(&self) -> Vec<(String, i64)> {
        let mut out: Vec<(String, i64)> = Vec::new();
        for line in &self.lines {
            match out.iter_mut().find(|(id, _)| *id == line.product_id) {
                Some((_, qty)) => *qty = qty.saturating_add(line.quantity),
                None => out.push((line.product_id.clone(), line.quantity)),
            }
        }
        out
    }

    /// Computes subtotal, tax and total for this cart at `rate`.
    ///
    /// ## Errors
    /// - `EmptyCart` when there are no lines
    /// - `Validation` when there are more than `MAX_CART_ITEMS` lines, a line
    ///   quantity is outside `1..=MAX_ITEM_QUANTITY`, a unit price is
    ///   negative, or an amount does not fit in `i64`
    /// - `InvalidDiscount` when the discount is negative or exceeds the
    ///   subtotal
    pub fn totals(&self, rate: TaxRate) -> CoreResult<SaleTotals> {
        if self.lines.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        validate_cart_size(self.lines.len())?;
        for line in &self.lines {
            validate_quantity(line.quantity)?;
            validate_non_negative("price", line.unit_price_cents)?;
        }

        let subtotal = self.subtotal()?;
        let discount = Money::from_cents(self.discount_cents);

        if discount.is_negative() || discount > subtotal {
            return Err(CoreError::InvalidDiscount {
                discount_cents: self.discount_cents,
                subtotal_cents: subtotal.cents(),
            });
        }

        let tax = subtotal.calculate_tax(rate);
        let total = subtotal
            .checked_add(tax)
            .ok_or_else(|| amount_too_large("total"))?
            - discount;

        Ok(SaleTotals {
            subtotal_cents: subtotal.cents(),
            tax_cents: tax.cents(),
            discount_cents: discount.cents(),
            total_cents: total.cents(),
        })
    }
}

fn amount_too_large(field: &str) -> ValidationError {
    ValidationError::OutOfRange {
        field: field.to_string(),
        min: 0,
        max: i64::MAX,
    }
}

/// Fails with `InsufficientStock` when `requested` exceeds the product's
/// on-hand quantity.
pub fn ensure_available(product: &Product, requested: i64) -> CoreResult<()> {
    if product.has_stock_for(requested) {
        return Ok(());
    }
    Err(CoreError::InsufficientStock {
        product_id: product.id.clone(),
        code: product.code.clone(),
        available: product.quantity,
        requested,
    })
}

// =============================================================================
// Totals & Receipt
// =============================================================================

/// The money side of a sale, all in minor units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleTotals {
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
}

/// Returned by a successful checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleReceipt {
    pub sale_id: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub payment_method: PaymentMethod,
    pub customer_id: Option<String>,
    pub lines: Vec<CartLine>,
    pub totals: SaleTotals,
}

// =============================================================================
// Unit Tests
// =============================================================================
