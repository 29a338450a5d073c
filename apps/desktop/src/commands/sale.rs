//! # Sale Commands
//!
//! The cart lives in the UI and arrives whole with `createSale`; the host
//! keeps no cart of its own.
//!
//! ```text
//! createSale(cart)
//!      │  require(RecordSale) → cashier or admin
//!      ▼
//! SaleRepository::checkout(cart, user.id)   one transaction:
//!      │   tax rate ◄── settings row
//!      │   stock re-checked per product
//!      │   sale + items inserted, stock decremented
//!      ▼
//! SaleReceipt { saleId, totals, lines, ... }
//! ```

use tracing::{debug, info};

use super::IdArgs;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use dukkan_core::{Action, Cart, Sale, SaleReceipt, SaleWithItems};
use dukkan_db::SaleFilter;

/// Records the sale described by `cart` for the logged-in user.
///
/// ## Errors
/// * `VALIDATION_ERROR` - Empty cart, bad quantity or discount
/// * `INSUFFICIENT_STOCK` - A product is short at commit time
/// * `NOT_FOUND` - A line names a product that no longer exists
pub async fn create_sale(state: &AppState, cart: Cart) -> ApiResult<SaleReceipt> {
    let user = state.session.require(Action::RecordSale).await?;
    debug!(
        lines = cart.lines.len(),
        discount_cents = cart.discount_cents,
        "create_sale command"
    );

    let receipt = state.db.inner().sales().checkout(&cart, &user.id).await?;

    info!(
        sale_id = %receipt.sale_id,
        total_cents = receipt.totals.total_cents,
        cashier = %user.username,
        "Sale recorded"
    );
    Ok(receipt)
}

/// Sale headers, newest first.
pub async fn get_sales(state: &AppState, filter: SaleFilter) -> ApiResult<Vec<Sale>> {
    state.session.require(Action::ViewSales).await?;
    debug!(?filter, "get_sales command");

    Ok(state.db.inner().sales().list(&filter).await?)
}

/// One sale with its line items.
pub async fn get_sale(state: &AppState, args: IdArgs) -> ApiResult<SaleWithItems> {
    state.session.require(Action::ViewSales).await?;
    debug!(id = %args.id, "get_sale command");

    state
        .db
        .inner()
        .sales()
        .get(&args.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Sale", &args.id))
}
