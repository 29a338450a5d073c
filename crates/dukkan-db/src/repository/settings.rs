//! # Settings Repository
//!
//! Flat `key → value` rows. Interpretation lives in
//! [`dukkan_core::settings`]; this module only reads and writes rows.

use chrono::Utc;
use sqlx::SqlitePool;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::error::DbResult;
use dukkan_core::{Settings, SettingsPatch};

#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SettingsRepository { pool }
    }

    /// Every stored row.
    pub async fn get_all(&self) -> DbResult<HashMap<String, String>> {
        let rows: Vec<(String, String)> = sqlx::query_as("SELECT key, value FROM settings")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().collect())
    }

    pub async fn get(&self, key: &str) -> DbResult<Option<String>> {
        let value = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(value)
    }

    /// The typed snapshot. Fails if a stored value is malformed.
    pub async fn snapshot(&self) -> DbResult<Settings> {
        let rows = self.get_all().await?;
        Ok(Settings::from_map(&rows)?)
    }

    /// Validates `patch`, upserts the provided keys in one transaction, and
    /// returns the refreshed snapshot.
    pub async fn update(&self, patch: &SettingsPatch) -> DbResult<Settings> {
        let pairs = patch.to_pairs()?;
        debug!(keys = pairs.len(), "Updating settings");

        if !pairs.is_empty() {
            let now = Utc::now();
            let mut tx = self.pool.begin().await?;

            for (key, value) in &pairs {
                sqlx::query(
                    r#"
                    INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)
                    ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
                    "#,
                )
                .bind(*key)
                .bind(value)
                .bind(now)
                .execute(&mut *tx)
                .await?;
            }

            tx.commit().await?;

            let keys: Vec<&str> = pairs.iter().map(|(k, _)| *k).collect();
            info!(keys = ?keys, "Settings updated");
        }

        self.snapshot().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use dukkan_core::Theme;

    #[tokio::test]
    async fn test_defaults_seeded_by_migration() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let settings = db.settings().snapshot().await.unwrap();
        assert_eq!(settings, Settings::default());

        let rows = db.settings().get_all().await.unwrap();
        assert_eq!(rows.get("tax_rate").map(String::as_str), Some("15"));
        assert_eq!(rows.len(), 6);
    }

    #[tokio::test]
    async fn test_partial_update() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let updated = db
            .settings()
            .update(&SettingsPatch {
                company_name: Some("Dukkan Al-Hay".to_string()),
                theme: Some(Theme::Dark),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(updated.company_name, "Dukkan Al-Hay");
        assert_eq!(updated.theme, Theme::Dark);
        assert_eq!(updated.tax_rate.bps(), 1_500);
        assert_eq!(updated.currency, "SAR");
    }

    #[tokio::test]
    async fn test_invalid_patch_writes_nothing() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let err = db
            .settings()
            .update(&SettingsPatch {
                company_name: Some("Changed".to_string()),
                tax_rate: Some("lots".to_string()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(_)));

        let settings = db.settings().snapshot().await.unwrap();
        assert_eq!(settings.company_name, "POS System");
    }

    #[tokio::test]
    async fn test_malformed_row_fails_snapshot() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        sqlx::query("UPDATE settings SET value = 'abc' WHERE key = 'tax_rate'")
            .execute(db.pool())
            .await
            .unwrap();

        assert!(db.settings().snapshot().await.is_err());
        assert_eq!(db.settings().get("tax_rate").await.unwrap().as_deref(), Some("abc"));
    }
}
