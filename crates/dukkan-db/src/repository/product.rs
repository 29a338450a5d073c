//! # Product Repository
//!
//! Database operations for the product catalog.
//!
//! ## Key Operations
//! - Listing and case-insensitive search over code and name
//! - CRUD with code uniqueness enforced on create and update
//! - Delete refused while sale history references the product
//! - Manual stock adjustment (restock, shrinkage)
//!
//! Stock decrements for sales do NOT go through this repository; they run
//! inside the checkout transaction in [`super::sale`].

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use dukkan_core::validation::{normalize_search_query, validate_product_input};
use dukkan_core::{CoreError, Product, ProductInput, ValidationError};

const SELECT_PRODUCT: &str = r#"
    SELECT id, code, name, description, price_cents, cost_cents, quantity,
           category, image_path, created_at, updated_at
    FROM products
"#;

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
/// let hits = repo.search("لابتوب", 20).await?;
/// let product = repo.get_by_code("P001").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// All products ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        debug!("Listing products");

        let products = sqlx::query_as::<_, Product>(&format!("{SELECT_PRODUCT} ORDER BY name, code"))
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Products whose code or name contains `query`, case-insensitively.
    /// An empty query lists the first `limit` products by name.
    ///
    /// Exact code matches come first so a scanned code lands on top.
    pub async fn search(&self, query: &str, limit: u32) -> DbResult<Vec<Product>> {
        let query = normalize_search_query(query)?;
        debug!(query = %query, limit = %limit, "Searching products");

        let pattern = format!("%{}%", escape_like(&query.to_lowercase()));

        let products = sqlx::query_as::<_, Product>(&format!(
            r#"{SELECT_PRODUCT}
            WHERE lower(code) LIKE ?1 ESCAPE '\' OR lower(name) LIKE ?1 ESCAPE '\'
            ORDER BY (lower(code) = ?2) DESC, name, code
            LIMIT ?3"#
        ))
        .bind(&pattern)
        .bind(query.to_lowercase())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Search complete");
        Ok(products)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!("{SELECT_PRODUCT} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!("{SELECT_PRODUCT} WHERE code = ?1"))
            .bind(code.trim())
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Creates a product.
    ///
    /// ## Returns
    /// * `Ok(Product)` - The stored product with its generated id
    /// * `Err(DbError::UniqueViolation)` - Code already used
    /// * `Err(DbError::Domain(Validation))` - Missing or negative fields
    pub async fn create(&self, input: &ProductInput) -> DbResult<Product> {
        validate_product_input(input)?;
        let code = input.code.trim();
        debug!(code = %code, "Creating product");

        if self.get_by_code(code).await?.is_some() {
            return Err(DbError::duplicate("code", code));
        }

        let now = Utc::now();
        let product = Product {
            id: generate_product_id(),
            code: code.to_string(),
            name: input.name.trim().to_string(),
            description: input.description.clone(),
            price_cents: input.price_cents,
            cost_cents: input.cost_cents,
            quantity: input.quantity,
            category: input.category.clone(),
            image_path: input.image_path.clone(),
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO products (
                id, code, name, description, price_cents, cost_cents,
                quantity, category, image_path, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&product.id)
        .bind(&product.code)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(product.cost_cents)
        .bind(product.quantity)
        .bind(&product.category)
        .bind(&product.image_path)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        info!(id = %product.id, code = %product.code, "Product created");
        Ok(product)
    }

    /// Replaces every editable field of a product.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - No product with this id
    /// * `Err(DbError::UniqueViolation)` - Code belongs to another product
    pub async fn update(&self, id: &str, input: &ProductInput) -> DbResult<Product> {
        validate_product_input(input)?;
        let code = input.code.trim();
        debug!(id = %id, code = %code, "Updating product");

        if let Some(other) = self.get_by_code(code).await? {
            if other.id != id {
                return Err(DbError::duplicate("code", code));
            }
        }

        let result = sqlx::query(
            r#"
            UPDATE products SET
                code = ?2,
                name = ?3,
                description = ?4,
                price_cents = ?5,
                cost_cents = ?6,
                quantity = ?7,
                category = ?8,
                image_path = ?9,
                updated_at = ?10
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(code)
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(input.price_cents)
        .bind(input.cost_cents)
        .bind(input.quantity)
        .bind(&input.category)
        .bind(&input.image_path)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Deletes a product that has never been sold.
    ///
    /// ## Returns
    /// * `Err(DbError::InUse)` - Sale items reference the product
    /// * `Err(DbError::NotFound)` - No product with this id
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let references: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM sale_items WHERE product_id = ?1")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        if references > 0 {
            return Err(DbError::in_use("Product", id, references));
        }

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        info!(id = %id, "Product deleted");
        Ok(())
    }

    /// Adds `delta` to on-hand stock (negative to write off).
    ///
    /// ## Returns
    /// * `Err(Domain(InsufficientStock))` - The write-off exceeds on-hand stock
    /// * `Err(Domain(Validation))` - `delta` is zero, or the result would not
    ///   fit in `i64`
    /// * `Err(NotFound)` - No product with this id
    pub async fn adjust_stock(&self, id: &str, delta: i64) -> DbResult<Product> {
        debug!(id = %id, delta = %delta, "Adjusting stock");

        if delta == 0 {
            return Err(ValidationError::invalid_format("delta", "must not be zero").into());
        }

        let current = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))?;
        if current.quantity.checked_add(delta).is_none() {
            return Err(ValidationError::OutOfRange {
                field: "quantity".to_string(),
                min: 0,
                max: i64::MAX,
            }
            .into());
        }

        let result = sqlx::query(
            r#"
            UPDATE products
            SET quantity = quantity + ?2, updated_at = ?3
            WHERE id = ?1 AND quantity + ?2 >= 0
            "#,
        )
        .bind(id)
        .bind(delta)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        let product = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))?;

        if result.rows_affected() == 0 {
            return Err(CoreError::InsufficientStock {
                product_id: product.id,
                code: product.code,
                available: product.quantity,
                requested: delta.saturating_neg(),
            }
            .into());
        }

        info!(id = %product.id, quantity = product.quantity, "Stock adjusted");
        Ok(product)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Escapes LIKE wildcards so user input matches literally.
fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::test_support::{cart_of, seed_admin};
    use dukkan_core::PaymentMethod;

    fn input(code: &str, name: &str, price: i64, qty: i64) -> ProductInput {
        ProductInput {
            code: code.to_string(),
            name: name.to_string(),
            description: None,
            price_cents: price,
            cost_cents: 0,
            quantity: qty,
            category: None,
            image_path: None,
        }
    }

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let db = db().await;
        let repo = db.products();

        let created = repo.create(&input("P001", "Laptop", 299_999, 10)).await.unwrap();
        assert_eq!(created.code, "P001");

        let by_id = repo.get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(by_id, created);

        let by_code = repo.get_by_code("P001").await.unwrap().unwrap();
        assert_eq!(by_code.id, created.id);

        assert!(repo.get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_ordered_by_name() {
        let db = db().await;
        let repo = db.products();
        repo.create(&input("P2", "Mouse", 100, 1)).await.unwrap();
        repo.create(&input("P1", "Keyboard", 100, 1)).await.unwrap();
        repo.create(&input("P3", "Cable", 100, 1)).await.unwrap();

        let names: Vec<_> = repo.list().await.unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Cable", "Keyboard", "Mouse"]);
    }

    #[tokio::test]
    async fn test_duplicate_code_on_create() {
        let db = db().await;
        let repo = db.products();
        repo.create(&input("P001", "Laptop", 100, 1)).await.unwrap();

        let err = repo.create(&input("P001", "Other", 100, 1)).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_code_on_update() {
        let db = db().await;
        let repo = db.products();
        repo.create(&input("P001", "Laptop", 100, 1)).await.unwrap();
        let mouse = repo.create(&input("P002", "Mouse", 100, 1)).await.unwrap();

        let err = repo
            .update(&mouse.id, &input("P001", "Mouse", 100, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));

        // keeping its own code is fine
        let updated = repo
            .update(&mouse.id, &input("P002", "Wireless Mouse", 150, 4))
            .await
            .unwrap();
        assert_eq!(updated.name, "Wireless Mouse");
        assert_eq!(updated.price_cents, 150);
        assert_eq!(updated.quantity, 4);
    }

    #[tokio::test]
    async fn test_update_missing_product() {
        let db = db().await;
        let err = db
            .products()
            .update("nope", &input("P1", "X", 1, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_validation_rejects_negative_price() {
        let db = db().await;
        let err = db
            .products()
            .create(&input("P1", "X", -5, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_search_code_and_name() {
        let db = db().await;
        let repo = db.products();
        repo.create(&input("P001", "لابتوب HP", 100, 1)).await.unwrap();
        repo.create(&input("P002", "Logitech Mouse", 100, 1)).await.unwrap();
        repo.create(&input("KB-1", "Mechanical Keyboard", 100, 1)).await.unwrap();

        let hits = repo.search("mouse", 20).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].code, "P002");

        let hits = repo.search("p00", 20).await.unwrap();
        assert_eq!(hits.len(), 2);

        let hits = repo.search("لابتوب", 20).await.unwrap();
        assert_eq!(hits[0].code, "P001");

        assert_eq!(repo.search("", 2).await.unwrap().len(), 2);
        assert!(repo.search("%", 20).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_unreferenced() {
        let db = db().await;
        let repo = db.products();
        let p = repo.create(&input("P001", "Laptop", 100, 1)).await.unwrap();

        repo.delete(&p.id).await.unwrap();
        assert!(repo.list().await.unwrap().is_empty());

        let err = repo.delete(&p.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_referenced_product_conflicts() {
        let db = db().await;
        let admin = seed_admin(&db).await;
        let p = db
            .products()
            .create(&input("P001", "Laptop", 100, 5))
            .await
            .unwrap();

        db.sales()
            .checkout(&cart_of(&[(&p, 1)], PaymentMethod::Cash, 0), &admin.id)
            .await
            .unwrap();

        let err = db.products().delete(&p.id).await.unwrap_err();
        assert!(matches!(err, DbError::InUse { count: 1, .. }));
        assert!(db.products().get_by_id(&p.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_adjust_stock() {
        let db = db().await;
        let repo = db.products();
        let p = repo.create(&input("P001", "Laptop", 100, 3)).await.unwrap();

        let p2 = repo.adjust_stock(&p.id, 7).await.unwrap();
        assert_eq!(p2.quantity, 10);

        let err = repo.adjust_stock(&p.id, -11).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InsufficientStock { available: 10, requested: 11, .. })
        ));

        let err = repo.adjust_stock("missing", 1).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
        let err = repo.adjust_stock(&p.id, 0).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_adjust_stock_extremes() {
        let db = db().await;
        let repo = db.products();
        let p = repo.create(&input("P001", "Laptop", 100, 3)).await.unwrap();

        let err = repo.adjust_stock(&p.id, i64::MIN).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InsufficientStock { available: 3, requested: i64::MAX, .. })
        ));

        let err = repo.adjust_stock(&p.id, i64::MAX).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));

        assert_eq!(repo.get_by_id(&p.id).await.unwrap().unwrap().quantity, 3);
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }
}
