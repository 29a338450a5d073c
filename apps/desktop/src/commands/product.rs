//! # Product Commands
//!
//! Catalog listing and search for everyone logged in; changes for admins.
//!
//! ## Search Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Product Search Flow                                  │
//! │                                                                         │
//! │  Cashier types "p00" or "ماوس"                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  {"op":"searchProducts","args":{"query":"p00","limit":20}}              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌───────────────────────────────────────────┐                         │
//! │  │  Blank query?                             │                         │
//! │  │  YES: full catalog, ordered by name       │                         │
//! │  │  NO:  case-insensitive match on code/name │──► exact code first     │
//! │  └───────────────────────────────────────────┘                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Vec<Product> back to the product grid                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Deserialize;
use std::time::Instant;
use tracing::{debug, info};

use super::IdArgs;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use dukkan_core::{Action, Product, ProductInput};

const DEFAULT_SEARCH_LIMIT: u32 = 20;
const MAX_SEARCH_LIMIT: u32 = 100;

#[derive(Debug, Clone, Deserialize)]
pub struct SearchProductsArgs {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProductArgs {
    pub id: String,
    pub product: ProductInput,
}

/// Full catalog ordered by name.
pub async fn get_products(state: &AppState) -> ApiResult<Vec<Product>> {
    state.session.require(Action::ViewCatalog).await?;
    debug!("get_products command");

    Ok(state.db.inner().products().list().await?)
}

/// Searches the catalog by code or name.
///
/// ## Arguments
/// * `query` - Search term; blank returns the whole catalog
/// * `limit` - Maximum results (default: 20, max: 100)
pub async fn search_products(state: &AppState, args: SearchProductsArgs) -> ApiResult<Vec<Product>> {
    state.session.require(Action::ViewCatalog).await?;

    let start = Instant::now();
    let query = args.query.trim();
    let limit = args.limit.unwrap_or(DEFAULT_SEARCH_LIMIT).clamp(1, MAX_SEARCH_LIMIT);
    debug!(query = %query, limit = %limit, "search_products command");

    let products = state.db.inner().products().search(query, limit).await?;

    info!(
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        count = products.len(),
        query = %query,
        "search_products complete"
    );

    Ok(products)
}

pub async fn add_product(state: &AppState, input: ProductInput) -> ApiResult<Product> {
    state.session.require(Action::ManageProducts).await?;
    debug!(code = %input.code, "add_product command");

    Ok(state.db.inner().products().create(&input).await?)
}

pub async fn update_product(state: &AppState, args: UpdateProductArgs) -> ApiResult<Product> {
    state.session.require(Action::ManageProducts).await?;
    debug!(id = %args.id, "update_product command");

    Ok(state.db.inner().products().update(&args.id, &args.product).await?)
}

/// Removes a product that no sale references.
///
/// ## When This Occurs
/// A product with sale history yields `CONFLICT_ERROR`; the record stays.
pub async fn delete_product(state: &AppState, args: IdArgs) -> ApiResult<()> {
    state.session.require(Action::ManageProducts).await?;
    debug!(id = %args.id, "delete_product command");

    if args.id.trim().is_empty() {
        return Err(ApiError::validation("id is required"));
    }

    state.db.inner().products().delete(&args.id).await?;
    Ok(())
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdjustStockArgs {
    pub id: String,
    /// Units to add; negative writes stock off.
    pub delta: i64,
}

/// Restock or write off units outside of a sale.
pub async fn adjust_stock(state: &AppState, args: AdjustStockArgs) -> ApiResult<Product> {
    let user = state.session.require(Action::ManageProducts).await?;
    debug!(id = %args.id, delta = args.delta, "adjust_stock command");

    let product = state
        .db
        .inner()
        .products()
        .adjust_stock(&args.id, args.delta)
        .await?;

    info!(
        user_id = %user.id,
        code = %product.code,
        quantity = product.quantity,
        "Stock adjusted manually"
    );
    Ok(product)
}
