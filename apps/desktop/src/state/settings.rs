//! # Settings State
//!
//! The host's copy of the business settings. Loaded at startup, replaced
//! whenever `updateSettings` succeeds, and handed out by value.

use tokio::sync::RwLock;
use tracing::{info, warn};

use dukkan_core::Settings;
use dukkan_db::Database;

#[derive(Debug, Default)]
pub struct SettingsState {
    snapshot: RwLock<Settings>,
}

impl SettingsState {
    pub fn new(settings: Settings) -> Self {
        SettingsState {
            snapshot: RwLock::new(settings),
        }
    }

    /// Reads the stored settings.
    ///
    /// ## When This Occurs
    /// A stored value is malformed or the table cannot be read. The host
    /// keeps running on built-in defaults rather than refusing to start.
    pub async fn load(db: &Database) -> Self {
        match db.settings().snapshot().await {
            Ok(settings) => {
                info!(
                    language = %settings.language,
                    currency = %settings.currency,
                    tax_rate = %settings.tax_rate,
                    "Settings loaded"
                );
                SettingsState::new(settings)
            }
            Err(e) => {
                warn!(error = %e, "Could not load settings, using defaults");
                SettingsState::new(Settings::default())
            }
        }
    }

    pub async fn get(&self) -> Settings {
        self.snapshot.read().await.clone()
    }

    pub async fn replace(&self, settings: Settings) {
        *self.snapshot.write().await = settings;
    }
}
