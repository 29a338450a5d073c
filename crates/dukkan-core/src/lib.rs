//! # dukkan-core: Pure Business Logic for Dukkan POS
//!
//! This crate is the **heart** of Dukkan POS. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Dukkan POS Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Request/Response Bridge                      │   │
//! │  │    getProducts, createSale, login, getSalesReport, ...          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ dukkan-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌────────┐  │   │
//! │  │   │  types  │ │  money  │ │  cart   │ │ settings │ │ report │  │   │
//! │  │   │ Product │ │  Money  │ │  Cart   │ │ Settings │ │  fold  │  │   │
//! │  │   │  Sale   │ │ TaxRate │ │ Totals  │ │  Patch   │ │        │  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └──────────┘ └────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    dukkan-db (Database Layer)                   │   │
//! │  │          SQLite queries, migrations, atomic checkout            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Customer, Sale, Expense, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - Cart value object and sale totals
//! - [`access`] - Role capability checks
//! - [`settings`] - Typed view over the flat settings table
//! - [`report`] - Sales report aggregation
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use dukkan_core::money::Money;
//! use dukkan_core::types::TaxRate;
//!
//! // Create money from cents (never from floats!)
//! let subtotal = Money::from_cents(25_000); // 250.00
//!
//! // 15% VAT
//! let tax = subtotal.calculate_tax(TaxRate::from_bps(1500));
//! assert_eq!(tax.cents(), 3_750); // 37.50
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod access;
pub mod cart;
pub mod error;
pub mod money;
pub mod report;
pub mod settings;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use access::{can, Action};
pub use cart::{Cart, CartLine, SaleReceipt, SaleTotals};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use report::{DailyRevenue, DashboardSummary, DateRange, ProductRevenue, SalesReport};
pub use settings::{Settings, SettingsPatch, Theme};
pub use types::*;
pub use validation::ValidationResult;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Number of products listed in the "top products" section of a report
/// when the caller does not ask for a specific count.
pub const DEFAULT_TOP_PRODUCTS: usize = 5;

/// Maximum number of lines in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity on a single cart line. Catches a mistyped 1000 for 10
/// and keeps line totals far from `i64` limits.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Username of the administrator account created on first start.
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
