//! # State Module
//!
//! Application state for the bridge host.
//!
//! Each concern gets its own state type; [`AppState`] only bundles them so a
//! single reference can be handed to the dispatcher.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                      AppState                                   │   │
//! │  │  built once by `AppState::bootstrap(db)`                        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                              │                                          │
//! │          ┌──────────────────┼──────────────────┐                       │
//! │          ▼                  ▼                  ▼                        │
//! │  ┌──────────────┐  ┌──────────────────┐  ┌──────────────────┐          │
//! │  │   DbState    │  │  SessionState    │  │  SettingsState   │          │
//! │  │              │  │                  │  │                  │          │
//! │  │  Database    │  │  RwLock<Option<  │  │  RwLock<         │          │
//! │  │  (SQLite     │  │   Authenticated  │  │    Settings>     │          │
//! │  │   pool)      │  │   User>>         │  │                  │          │
//! │  └──────────────┘  └──────────────────┘  └──────────────────┘          │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • DbState: Database has internal connection pool (thread-safe)        │
//! │  • SessionState: replaced on login/logout                              │
//! │  • SettingsState: replaced after every successful update               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod db;
mod session;
mod settings;

pub use db::DbState;
pub use session::SessionState;
pub use settings::SettingsState;

use tracing::info;

use dukkan_db::{Database, DbResult};

/// Password given to the bootstrapped `admin` account unless overridden.
pub const DEFAULT_ADMIN_PASSWORD: &str = "password";

/// Everything a bridge operation may touch.
#[derive(Debug)]
pub struct AppState {
    pub db: DbState,
    pub session: SessionState,
    pub settings: SettingsState,
}

impl AppState {
    /// Prepares state for a fresh run.
    ///
    /// Creates the default administrator when there are no users, then loads
    /// the settings snapshot (falling back to defaults if it cannot be read).
    /// Nobody is logged in afterwards.
    pub async fn bootstrap(db: Database, admin_password: &str) -> DbResult<Self> {
        if let Some(admin) = db.users().ensure_default_admin(admin_password).await? {
            info!(username = %admin.username, "Default administrator created");
        }

        let settings = SettingsState::load(&db).await;

        Ok(AppState {
            db: DbState::new(db),
            session: SessionState::new(),
            settings,
        })
    }
}
