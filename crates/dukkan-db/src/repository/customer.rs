//! # Customer Repository
//!
//! CRUD for the customer registry. A sale may reference a customer or be a
//! walk-in (no customer); referenced customers cannot be deleted.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use dukkan_core::validation::{normalize_search_query, validate_customer_input};
use dukkan_core::{Customer, CustomerInput};

#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// All customers ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Customer>> {
        debug!("Listing customers");

        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, name, phone, email, address, created_at
            FROM customers
            ORDER BY name, created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Customers whose name or phone contains `query`.
    pub async fn search(&self, query: &str) -> DbResult<Vec<Customer>> {
        let query = normalize_search_query(query)?;
        if query.is_empty() {
            return self.list().await;
        }
        debug!(query = %query, "Searching customers");

        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, name, phone, email, address, created_at
            FROM customers
            WHERE instr(lower(name), ?1) > 0 OR instr(ifnull(phone, ''), ?1) > 0
            ORDER BY name
            "#,
        )
        .bind(query.to_lowercase())
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            "SELECT id, name, phone, email, address, created_at FROM customers WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    pub async fn create(&self, input: &CustomerInput) -> DbResult<Customer> {
        validate_customer_input(input)?;

        let customer = Customer {
            id: Uuid::new_v4().to_string(),
            name: input.name.trim().to_string(),
            phone: non_blank(&input.phone),
            email: non_blank(&input.email),
            address: non_blank(&input.address),
            created_at: Utc::now(),
        };
        debug!(id = %customer.id, "Creating customer");

        sqlx::query(
            r#"
            INSERT INTO customers (id, name, phone, email, address, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.email)
        .bind(&customer.address)
        .bind(customer.created_at)
        .execute(&self.pool)
        .await?;

        info!(id = %customer.id, "Customer created");
        Ok(customer)
    }

    pub async fn update(&self, id: &str, input: &CustomerInput) -> DbResult<Customer> {
        validate_customer_input(input)?;
        debug!(id = %id, "Updating customer");

        let result = sqlx::query(
            r#"
            UPDATE customers SET name = ?2, phone = ?3, email = ?4, address = ?5
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(non_blank(&input.phone))
        .bind(non_blank(&input.email))
        .bind(non_blank(&input.address))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", id))
    }

    /// Deletes a customer with no recorded sales.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting customer");

        let references: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales WHERE customer_id = ?1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        if references > 0 {
            return Err(DbError::in_use("Customer", id, references));
        }

        let result = sqlx::query("DELETE FROM customers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        info!(id = %id, "Customer deleted");
        Ok(())
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
