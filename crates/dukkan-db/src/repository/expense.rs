//! # Expense Repository
//!
//! A simple ledger of money going out, independent of sales.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::DbResult;
use dukkan_core::validation::validate_expense_input;
use dukkan_core::{DateRange, Expense, ExpenseInput};

#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    pool: SqlitePool,
}

impl ExpenseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ExpenseRepository { pool }
    }

    pub async fn create(&self, input: &ExpenseInput, user_id: &str) -> DbResult<Expense> {
        validate_expense_input(input)?;

        let expense = Expense {
            id: Uuid::new_v4().to_string(),
            description: input.description.trim().to_string(),
            amount_cents: input.amount_cents,
            category: input.category.trim().to_string(),
            user_id: user_id.to_string(),
            created_at: Utc::now(),
        };
        debug!(id = %expense.id, amount_cents = expense.amount_cents, "Recording expense");

        sqlx::query(
            r#"
            INSERT INTO expenses (id, description, amount_cents, category, user_id, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&expense.id)
        .bind(&expense.description)
        .bind(expense.amount_cents)
        .bind(&expense.category)
        .bind(&expense.user_id)
        .bind(expense.created_at)
        .execute(&self.pool)
        .await?;

        info!(id = %expense.id, "Expense recorded");
        Ok(expense)
    }

    /// Expenses within an inclusive date range, newest first.
    pub async fn list(&self, range: DateRange) -> DbResult<Vec<Expense>> {
        let (from, to) = range.bounds();

        let expenses = sqlx::query_as::<_, Expense>(
            r#"
            SELECT id, description, amount_cents, category, user_id, created_at
            FROM expenses
            WHERE created_at >= ?1 AND created_at < ?2
            ORDER BY created_at DESC
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(expenses)
    }

    pub async fn total(&self, range: DateRange) -> DbResult<i64> {
        let (from, to) = range.bounds();
        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount_cents), 0) FROM expenses WHERE created_at >= ?1 AND created_at < ?2",
        )
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }
}
