//! # Sale Repository
//!
//! The checkout transaction, plus read access to recorded sales.
//!
//! ## Checkout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  checkout(&cart, user_id)                                               │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │   ├── read tax_rate from settings                                       │
//! │   ├── cart.totals(rate)          subtotal, tax, discount, total         │
//! │   ├── for each product in cart:  re-read on-hand, ensure_available      │
//! │   ├── customer_id given?         must exist, else NotFound              │
//! │   ├── INSERT sales               one header row                         │
//! │   ├── INSERT sale_items          one row per cart line                  │
//! │   └── UPDATE products            quantity -= qty WHERE quantity >= qty  │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Any error before COMMIT drops the transaction: no sale, no items,      │
//! │  no stock change.                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Recorded sales are never updated or deleted.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use std::collections::HashMap;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use dukkan_core::cart::ensure_available;
use dukkan_core::report::DashboardSummary;
use dukkan_core::settings::KEY_TAX_RATE;
use dukkan_core::{
    Cart, CoreError, DateRange, Product, Sale, SaleItem, SaleReceipt, SaleWithItems, SalesReport,
    Settings, TaxRate,
};

const SELECT_SALE: &str = r#"
    SELECT id, customer_id, user_id, subtotal_cents, tax_cents, discount_cents,
           total_cents, payment_method, created_at
    FROM sales
"#;

/// Optional filters for listing sales.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleFilter {
    #[serde(default)]
    pub range: Option<DateRange>,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub limit: Option<u32>,
}

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Records a sale for `cart`, attributed to `user_id`, atomically.
    ///
    /// ## Returns
    /// * `Ok(SaleReceipt)` - Sale committed, stock decremented
    /// * `Err(Domain(EmptyCart | InvalidDiscount | Validation))` - Bad cart
    /// * `Err(Domain(InsufficientStock))` - A product is short at commit time
    /// * `Err(NotFound)` - A cart line names a product that no longer exists,
    ///   or the cart names an unknown customer
    ///
    /// Nothing is written on any error.
    pub async fn checkout(&self, cart: &Cart, user_id: &str) -> DbResult<SaleReceipt> {
        if cart.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }

        debug!(
            lines = cart.lines.len(),
            user_id = %user_id,
            "Starting checkout"
        );

        let mut tx = self.pool.begin().await?;

        let rate = read_tax_rate(&mut *tx).await?;
        let totals = cart.totals(rate)?;

        for (product_id, requested) in cart.requested_quantities() {
            let product = fetch_product(&mut *tx, &product_id)
                .await?
                .ok_or_else(|| DbError::not_found("Product", &product_id))?;
            ensure_available(&product, requested)?;
        }

        if let Some(customer_id) = &cart.customer_id {
            if !customer_exists(&mut *tx, customer_id).await? {
                return Err(DbError::not_found("Customer", customer_id));
            }
        }

        let sale = Sale {
            id: Uuid::new_v4().to_string(),
            customer_id: cart.customer_id.clone(),
            user_id: user_id.to_string(),
            subtotal_cents: totals.subtotal_cents,
            tax_cents: totals.tax_cents,
            discount_cents: totals.discount_cents,
            total_cents: totals.total_cents,
            payment_method: cart.payment_method,
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, customer_id, user_id, subtotal_cents, tax_cents,
                discount_cents, total_cents, payment_method, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.customer_id)
        .bind(&sale.user_id)
        .bind(sale.subtotal_cents)
        .bind(sale.tax_cents)
        .bind(sale.discount_cents)
        .bind(sale.total_cents)
        .bind(sale.payment_method)
        .bind(sale.created_at)
        .execute(&mut *tx)
        .await?;

        for line in &cart.lines {
            sqlx::query(
                r#"
                INSERT INTO sale_items (
                    id, sale_id, product_id, code_snapshot, name_snapshot,
                    quantity, unit_price_cents, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&sale.id)
            .bind(&line.product_id)
            .bind(&line.code)
            .bind(&line.name)
            .bind(line.quantity)
            .bind(line.unit_price_cents)
            .bind(sale.created_at)
            .execute(&mut *tx)
            .await?;

            let result = sqlx::query(
                r#"
                UPDATE products
                SET quantity = quantity - ?2, updated_at = ?3
                WHERE id = ?1 AND quantity >= ?2
                "#,
            )
            .bind(&line.product_id)
            .bind(line.quantity)
            .bind(sale.created_at)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                // stock moved under us between the check and the decrement
                let product = fetch_product(&mut *tx, &line.product_id)
                    .await?
                    .ok_or_else(|| DbError::not_found("Product", &line.product_id))?;
                warn!(code = %product.code, "Stock changed during checkout");
                return Err(CoreError::InsufficientStock {
                    product_id: product.id,
                    code: product.code,
                    available: product.quantity,
                    requested: line.quantity,
                }
                .into());
            }
        }

        tx.commit().await?;

        info!(
            sale_id = %sale.id,
            total_cents = sale.total_cents,
            lines = cart.lines.len(),
            "Sale completed"
        );

        Ok(SaleReceipt {
            sale_id: sale.id,
            created_at: sale.created_at,
            payment_method: sale.payment_method,
            customer_id: sale.customer_id,
            lines: cart.lines.clone(),
            totals,
        })
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(&format!("{SELECT_SALE} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(sale)
    }

    /// Line items of a sale, in the order they were rung up.
    pub async fn get_items(&self, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        let items = sqlx::query_as::<_, SaleItem>(
            r#"
            SELECT id, sale_id, product_id, code_snapshot, name_snapshot,
                   quantity, unit_price_cents, created_at
            FROM sale_items
            WHERE sale_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// A sale with its items.
    pub async fn get(&self, id: &str) -> DbResult<Option<SaleWithItems>> {
        let Some(sale) = self.get_by_id(id).await? else {
            return Ok(None);
        };
        let items = self.get_items(&sale.id).await?;
        Ok(Some(SaleWithItems { sale, items }))
    }

    /// Sale headers matching `filter`, newest first.
    pub async fn list(&self, filter: &SaleFilter) -> DbResult<Vec<Sale>> {
        debug!(?filter, "Listing sales");

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(SELECT_SALE);
        qb.push(" WHERE 1 = 1");

        if let Some(range) = filter.range {
            let (from, to) = range.bounds();
            qb.push(" AND created_at >= ").push_bind(from);
            qb.push(" AND created_at < ").push_bind(to);
        }
        if let Some(customer_id) = &filter.customer_id {
            qb.push(" AND customer_id = ").push_bind(customer_id.clone());
        }
        if let Some(user_id) = &filter.user_id {
            qb.push(" AND user_id = ").push_bind(user_id.clone());
        }

        qb.push(" ORDER BY created_at DESC, rowid DESC");

        if let Some(limit) = filter.limit {
            qb.push(" LIMIT ").push_bind(limit as i64);
        }

        let sales = qb.build_query_as::<Sale>().fetch_all(&self.pool).await?;
        Ok(sales)
    }

    /// Every sale in `range` with its items, oldest first.
    pub async fn list_with_items(&self, range: DateRange) -> DbResult<Vec<SaleWithItems>> {
        let (from, to) = range.bounds();

        let sales = sqlx::query_as::<_, Sale>(&format!(
            "{SELECT_SALE} WHERE created_at >= ?1 AND created_at < ?2 ORDER BY created_at, rowid"
        ))
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        let items = sqlx::query_as::<_, SaleItem>(
            r#"
            SELECT si.id, si.sale_id, si.product_id, si.code_snapshot, si.name_snapshot,
                   si.quantity, si.unit_price_cents, si.created_at
            FROM sale_items si
            JOIN sales s ON s.id = si.sale_id
            WHERE s.created_at >= ?1 AND s.created_at < ?2
            ORDER BY si.rowid
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        let mut by_sale: HashMap<String, Vec<SaleItem>> = HashMap::new();
        for item in items {
            by_sale.entry(item.sale_id.clone()).or_default().push(item);
        }

        Ok(sales
            .into_iter()
            .map(|sale| {
                let items = by_sale.remove(&sale.id).unwrap_or_default();
                SaleWithItems { sale, items }
            })
            .collect())
    }

    /// Sales report over an inclusive date range.
    pub async fn report(&self, range: DateRange, top_n: usize) -> DbResult<SalesReport> {
        let sales = self.list_with_items(range).await?;
        debug!(sales = sales.len(), "Building sales report");
        Ok(SalesReport::build(range, &sales, top_n))
    }

    /// Today / month-to-date / last-7-days figures as of `today`.
    pub async fn dashboard(&self, today: NaiveDate) -> DbResult<DashboardSummary> {
        let sales = self
            .list_with_items(DashboardSummary::window(today))
            .await?;
        Ok(DashboardSummary::build(today, &sales))
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Transaction Helpers
// =============================================================================

async fn read_tax_rate(conn: &mut SqliteConnection) -> DbResult<TaxRate> {
    let value: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?1")
        .bind(KEY_TAX_RATE)
        .fetch_optional(&mut *conn)
        .await?;

    match value {
        Some(v) => Ok(TaxRate::parse_percent(&v)?),
        None => Ok(Settings::default().tax_rate),
    }
}

async fn customer_exists(conn: &mut SqliteConnection, id: &str) -> DbResult<bool> {
    let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM customers WHERE id = ?1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(found.is_some())
}

async fn fetch_product(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(
        r#"
        SELECT id, code, name, description, price_cents, cost_cents, quantity,
               category, image_path, created_at, updated_at
        FROM products
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(product)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::test_support::{cart_of, seed_admin, seed_product};
    use dukkan_core::{CartLine, CustomerInput, PaymentMethod, ProductInput, SettingsPatch};

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn on_hand(db: &Database, id: &str) -> i64 {
        db.products().get_by_id(id).await.unwrap().unwrap().quantity
    }

    async fn item_count(db: &Database) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM sale_items")
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_reference_scenario() {
        let db = db().await;
        let admin = seed_admin(&db).await;
        let a = seed_product(&db, "A", 10_000, 10).await;
        let b = seed_product(&db, "B", 5_000, 5).await;

        let cart = cart_of(&[(&a, 2), (&b, 1)], PaymentMethod::Cash, 2_000);
        let receipt = db.sales().checkout(&cart, &admin.id).await.unwrap();

        assert_eq!(receipt.totals.subtotal_cents, 25_000);
        assert_eq!(receipt.totals.tax_cents, 3_750);
        assert_eq!(receipt.totals.total_cents, 26_750);
        assert_eq!(receipt.lines.len(), 2);

        assert_eq!(on_hand(&db, &a.id).await, 8);
        assert_eq!(on_hand(&db, &b.id).await, 4);

        let stored = db.sales().get(&receipt.sale_id).await.unwrap().unwrap();
        assert_eq!(stored.sale.total_cents, 26_750);
        assert_eq!(stored.sale.user_id, admin.id);
        assert_eq!(stored.sale.payment_method, PaymentMethod::Cash);
        assert_eq!(stored.items.len(), 2);
        assert_eq!(stored.items[0].code_snapshot, "A");
        assert_eq!(stored.items[0].quantity, 2);
        let subtotal: i64 = stored.items.iter().map(|i| i.line_total().cents()).sum();
        assert_eq!(subtotal, stored.sale.subtotal_cents);
    }

    #[tokio::test]
    async fn test_insufficient_stock_writes_nothing() {
        let db = db().await;
        let admin = seed_admin(&db).await;
        let p = seed_product(&db, "P", 1_000, 3).await;

        let cart = cart_of(&[(&p, 5)], PaymentMethod::Cash, 0);
        let err = db.sales().checkout(&cart, &admin.id).await.unwrap_err();

        match err {
            DbError::Domain(e @ CoreError::InsufficientStock { .. }) => {
                assert_eq!(e.shortfall(), Some(2));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(db.sales().count().await.unwrap(), 0);
        assert_eq!(item_count(&db).await, 0);
        assert_eq!(on_hand(&db, &p.id).await, 3);
    }

    #[tokio::test]
    async fn test_second_line_short_rolls_back_first() {
        let db = db().await;
        let admin = seed_admin(&db).await;
        let a = seed_product(&db, "A", 1_000, 10).await;
        let b = seed_product(&db, "B", 1_000, 1).await;

        let cart = cart_of(&[(&a, 2), (&b, 2)], PaymentMethod::Cash, 0);
        assert!(db.sales().checkout(&cart, &admin.id).await.is_err());

        assert_eq!(on_hand(&db, &a.id).await, 10);
        assert_eq!(on_hand(&db, &b.id).await, 1);
        assert_eq!(db.sales().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_lines_checked_together() {
        let db = db().await;
        let admin = seed_admin(&db).await;
        let p = seed_product(&db, "P", 100, 4).await;

        let line = |qty| CartLine::from_product(&p, qty);
        let cart = Cart {
            lines: vec![line(3), line(2)],
            ..Cart::default()
        };
        let err = db.sales().checkout(&cart, &admin.id).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InsufficientStock { requested: 5, available: 4, .. })
        ));
        assert_eq!(on_hand(&db, &p.id).await, 4);
    }

    #[tokio::test]
    async fn test_stock_exactly_exhausted() {
        let db = db().await;
        let admin = seed_admin(&db).await;
        let p = seed_product(&db, "P", 100, 2).await;

        db.sales()
            .checkout(&cart_of(&[(&p, 2)], PaymentMethod::Card, 0), &admin.id)
            .await
            .unwrap();
        assert_eq!(on_hand(&db, &p.id).await, 0);

        let err = db
            .sales()
            .checkout(&cart_of(&[(&p, 1)], PaymentMethod::Card, 0), &admin.id)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::InsufficientStock { .. })));
    }

    #[tokio::test]
    async fn test_empty_cart_and_bad_discount() {
        let db = db().await;
        let admin = seed_admin(&db).await;
        let p = seed_product(&db, "P", 1_000, 5).await;

        let err = db.sales().checkout(&Cart::new(), &admin.id).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::EmptyCart)));

        let cart = cart_of(&[(&p, 1)], PaymentMethod::Cash, 5_000);
        let err = db.sales().checkout(&cart, &admin.id).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::InvalidDiscount { .. })));

        assert_eq!(db.sales().count().await.unwrap(), 0);
        assert_eq!(on_hand(&db, &p.id).await, 5);
    }

    #[tokio::test]
    async fn test_unknown_product() {
        let db = db().await;
        let admin = seed_admin(&db).await;
        let cart = Cart {
            lines: vec![CartLine {
                product_id: "ghost".to_string(),
                code: "G".to_string(),
                name: "Ghost".to_string(),
                unit_price_cents: 100,
                quantity: 1,
            }],
            ..Cart::default()
        };

        let err = db.sales().checkout(&cart, &admin.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
        assert_eq!(db.sales().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_customer_writes_nothing() {
        let db = db().await;
        let admin = seed_admin(&db).await;
        let p = seed_product(&db, "P", 1_000, 5).await;

        let mut cart = cart_of(&[(&p, 2)], PaymentMethod::Cash, 0);
        cart.customer_id = Some("ghost".to_string());

        let err = db.sales().checkout(&cart, &admin.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { ref entity, ref id } if entity == "Customer" && id == "ghost"));
        assert_eq!(db.sales().count().await.unwrap(), 0);
        assert_eq!(item_count(&db).await, 0);
        assert_eq!(on_hand(&db, &p.id).await, 5);

        let customer = db
            .customers()
            .create(&CustomerInput {
                name: "Sara".to_string(),
                phone: None,
                email: None,
                address: None,
            })
            .await
            .unwrap();
        cart.customer_id = Some(customer.id.clone());

        let receipt = db.sales().checkout(&cart, &admin.id).await.unwrap();
        assert_eq!(receipt.customer_id, Some(customer.id));
        assert_eq!(on_hand(&db, &p.id).await, 3);
    }

    #[tokio::test]
    async fn test_tax_rate_read_from_settings() {
        let db = db().await;
        let admin = seed_admin(&db).await;
        let p = seed_product(&db, "P", 10_000, 5).await;

        db.settings()
            .update(&SettingsPatch {
                tax_rate: Some("5".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        let receipt = db
            .sales()
            .checkout(&cart_of(&[(&p, 1)], PaymentMethod::Cash, 0), &admin.id)
            .await
            .unwrap();
        assert_eq!(receipt.totals.tax_cents, 500);
        assert_eq!(receipt.totals.total_cents, 10_500);
    }

    #[tokio::test]
    async fn test_snapshot_survives_rename() {
        let db = db().await;
        let admin = seed_admin(&db).await;
        let p = seed_product(&db, "P", 1_000, 5).await;

        let receipt = db
            .sales()
            .checkout(&cart_of(&[(&p, 1)], PaymentMethod::Cash, 0), &admin.id)
            .await
            .unwrap();

        db.products()
            .update(
                &p.id,
                &ProductInput {
                    code: "P-NEW".to_string(),
                    name: "Renamed".to_string(),
                    description: None,
                    price_cents: 9_999,
                    cost_cents: 0,
                    quantity: 4,
                    category: None,
                    image_path: None,
                },
            )
            .await
            .unwrap();

        let stored = db.sales().get(&receipt.sale_id).await.unwrap().unwrap();
        assert_eq!(stored.items[0].code_snapshot, "P");
        assert_eq!(stored.items[0].unit_price_cents, 1_000);
    }

    #[tokio::test]
    async fn test_list_and_report() {
        let db = db().await;
        let admin = seed_admin(&db).await;
        let a = seed_product(&db, "A", 1_000, 50).await;
        let b = seed_product(&db, "B", 3_000, 50).await;

        let r1 = db
            .sales()
            .checkout(&cart_of(&[(&a, 1)], PaymentMethod::Cash, 0), &admin.id)
            .await
            .unwrap();
        let r2 = db
            .sales()
            .checkout(&cart_of(&[(&b, 1), (&a, 2)], PaymentMethod::Card, 0), &admin.id)
            .await
            .unwrap();

        let today = Utc::now().date_naive();
        let range = DateRange::single_day(today);

        let listed = db
            .sales()
            .list(&SaleFilter {
                range: Some(range),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, r2.sale_id);

        let limited = db
            .sales()
            .list(&SaleFilter {
                limit: Some(1),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(limited.len(), 1);

        let report = db.sales().report(range, 5).await.unwrap();
        assert_eq!(report.sale_count, 2);
        assert_eq!(
            report.total_revenue_cents,
            r1.totals.total_cents + r2.totals.total_cents
        );
        assert_eq!(report.daily.len(), 1);
        assert_eq!(report.top_products[0].code, "A");
        assert_eq!(report.top_products[0].quantity, 3);
        assert_eq!(report.top_products[0].revenue_cents, 3_000);
        assert_eq!(report.top_products[1].code, "B");

        let yesterday = today.pred_opt().unwrap();
        let empty = db
            .sales()
            .report(DateRange::single_day(yesterday), 5)
            .await
            .unwrap();
        assert_eq!(empty.sale_count, 0);
        assert_eq!(empty.total_revenue_cents, 0);

        let dash = db.sales().dashboard(today).await.unwrap();
        assert_eq!(dash.today_sale_count, 2);
        assert_eq!(dash.today_revenue_cents, report.total_revenue_cents);
        assert_eq!(dash.last_7_days.len(), 7);
    }
}
