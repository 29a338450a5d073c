//! # Database Migrations
//!
//! Embedded SQL migrations for Dukkan POS.
//!
//! ```text
//! migrations/sqlite/
//! ├── 001_initial_schema.sql   products, customers, users, sales,
//! │                            sale_items, expenses, settings
//! └── 002_default_settings.sql language, currency, tax_rate, ...
//! ```
//!
//! New schema changes always go in a new numbered file; applied files are
//! never edited (sqlx checks their checksums).

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

/// All files under `migrations/sqlite`, embedded at compile time.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Applies pending migrations in filename order. Safe to call repeatedly.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    info!("Checking for pending migrations");

    MIGRATOR.run(pool).await?;

    info!("All migrations applied successfully");
    Ok(())
}

/// `(embedded, applied)` migration counts, for diagnostics.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let total = MIGRATOR.migrations.len();

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(pool)
        .await?;

    Ok((total, applied as usize))
}

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_all_migrations_applied() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let (total, applied) = super::migration_status(db.pool()).await.unwrap();
        assert_eq!(total, 2);
        assert_eq!(applied, 2);
    }

    #[tokio::test]
    async fn test_migrations_idempotent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.run_migrations().await.unwrap();
        let (_, applied) = super::migration_status(db.pool()).await.unwrap();
        assert_eq!(applied, 2);
    }
}
