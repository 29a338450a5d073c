//! # Repository Module
//!
//! One repository per table family. Each holds a clone of the pool and is
//! obtained from [`crate::Database`].
//!
//! ```text
//! Bridge command
//!      │   db.sales().checkout(&cart, user_id)
//!      ▼
//! ┌──────────────────────┐
//! │ ProductRepository    │  list, search, CRUD, stock adjustment
//! │ CustomerRepository   │  list, search, CRUD
//! │ UserRepository       │  accounts, authenticate
//! │ SaleRepository       │  checkout (transaction), list, report
//! │ ExpenseRepository    │  record, list by date
//! │ SettingsRepository   │  rows ⇄ typed snapshot
//! └──────────┬───────────┘
//!            ▼
//!        SQLite
//! ```

pub mod customer;
pub mod expense;
pub mod product;
pub mod sale;
pub mod settings;
pub mod user;

#[cfg(test)]
pub(crate) mod test_support;
