//! # Database State
//!
//! Wraps the `Database` connection for use in bridge commands.
//!
//! ## Thread Safety
//! The `Database` struct from `dukkan-db` contains a `SqlitePool` which is
//! thread-safe, so commands query it without extra locking.
//!
//! ## Usage in Commands
//! ```rust,ignore
//! pub async fn get_products(state: &AppState) -> ApiResult<Vec<Product>> {
//!     state.session.require(Action::ViewCatalog).await?;
//!     Ok(state.db.inner().products().list().await?)
//! }
//! ```

use dukkan_db::Database;

#[derive(Debug)]
pub struct DbState {
    db: Database,
}

impl DbState {
    pub fn new(db: Database) -> Self {
        DbState { db }
    }

    pub fn inner(&self) -> &Database {
        &self.db
    }
}
