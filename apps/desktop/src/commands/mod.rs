//! # Bridge Commands Module
//!
//! Every operation the UI can request, one async function per operation.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs       ◄─── You are here (shared argument types)
//! ├── bridge.rs    ◄─── Request parsing, dispatch, stdin/stdout loop
//! ├── auth.rs      ◄─── login, logout, currentUser, addUser
//! ├── product.rs   ◄─── Catalog list/search/CRUD
//! ├── customer.rs  ◄─── Customer list/CRUD
//! ├── sale.rs      ◄─── Checkout and sale history
//! ├── expense.rs   ◄─── Expense ledger
//! ├── report.rs    ◄─── Sales report and dashboard
//! └── settings.rs  ◄─── Settings snapshot and updates
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Bridge Command Flow                                  │
//! │                                                                         │
//! │  UI writes one line to stdin:                                           │
//! │  {"op":"searchProducts","args":{"query":"ماوس"}}                        │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  bridge::handle_line ── parse ──► Request::SearchProducts(args)         │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  product::search_products(&state, args)                                 │
//! │      state.session.require(Action::ViewCatalog)  ◄── capability gate   │
//! │      state.db.inner().products().search(...)                            │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  One line on stdout: {"ok":true,"data":[...]}                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod bridge;
pub mod customer;
pub mod expense;
pub mod product;
pub mod report;
pub mod sale;
pub mod settings;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::ApiResult;
use dukkan_core::DateRange;

/// Arguments naming a single record.
#[derive(Debug, Clone, Deserialize)]
pub struct IdArgs {
    pub id: String,
}

/// Inclusive `YYYY-MM-DD` date range.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DateRangeArgs {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRangeArgs {
    pub fn to_range(self) -> ApiResult<DateRange> {
        Ok(DateRange::new(self.start, self.end)?)
    }
}
