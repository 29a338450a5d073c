//! # Dukkan Desktop Library
//!
//! Backend host for the Dukkan point of sale. The UI process spawns the
//! `dukkan-desktop` binary and exchanges JSON lines with it over
//! stdin/stdout; everything here is the Rust side of that conversation.
//!
//! ## Module Organization
//! ```text
//! dukkan_desktop_lib/
//! ├── lib.rs          ◄─── You are here (startup & run)
//! ├── state/
//! │   ├── mod.rs      ◄─── AppState and bootstrap
//! │   ├── db.rs       ◄─── Database state wrapper
//! │   ├── session.rs  ◄─── Logged-in user + capability gate
//! │   └── settings.rs ◄─── Settings snapshot
//! ├── commands/
//! │   ├── bridge.rs   ◄─── Request parsing, dispatch, line loop
//! │   └── ...         ◄─── One module per area (product, sale, ...)
//! └── error.rs        ◄─── API error type for commands
//! ```
//!
//! ## Process I/O
//! ```text
//! ┌──────────────┐  request line   ┌──────────────────────┐
//! │      UI      │ ──── stdin ───► │   dukkan-desktop     │
//! │              │ ◄─── stdout ─── │                      │
//! └──────────────┘  response line  │   logs ──► stderr    │
//!                                  └──────────────────────┘
//! ```

pub mod commands;
pub mod error;
pub mod state;

#[cfg(test)]
mod test_support;

use directories::ProjectDirs;
use std::error::Error;
use std::path::PathBuf;
use tokio::io::{stdin, stdout, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

use dukkan_db::{Database, DbConfig};
use state::{AppState, DEFAULT_ADMIN_PASSWORD};

/// Runs the host until stdin closes.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Application Startup                               │
/// │                                                                         │
/// │  1. Initialize Logging ───────────────────────────────────────────────► │
/// │     • tracing-subscriber with env filter, written to stderr             │
/// │     • Default: info,dukkan=debug,sqlx=warn; override with RUST_LOG     │
/// │                                                                         │
/// │  2. Determine Database Path ──────────────────────────────────────────► │
/// │     • DUKKAN_DB_PATH if set                                             │
/// │     • otherwise the platform data directory (ProjectDirs)              │
/// │                                                                         │
/// │  3. Connect to Database ──────────────────────────────────────────────► │
/// │     • SQLite with WAL mode, foreign keys on                             │
/// │     • Run pending migrations                                            │
/// │                                                                         │
/// │  4. Bootstrap State ──────────────────────────────────────────────────► │
/// │     • Default admin if there are no users (DUKKAN_ADMIN_PASSWORD)       │
/// │     • Settings snapshot, defaults on failure                            │
/// │                                                                         │
/// │  5. Serve stdin → stdout until end of input                            │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn run() -> Result<(), Box<dyn Error>> {
    init_tracing();

    info!("Starting Dukkan POS host");

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let db_path = get_database_path()?;
        info!(?db_path, "Database path determined");

        let db = Database::new(DbConfig::new(db_path)).await?;
        info!("Database connected and migrations applied");

        let admin_password = std::env::var("DUKKAN_ADMIN_PASSWORD")
            .unwrap_or_else(|_| DEFAULT_ADMIN_PASSWORD.to_string());
        let state = AppState::bootstrap(db, &admin_password).await?;
        info!("State initialized, waiting for requests");

        commands::bridge::serve(&state, BufReader::new(stdin()), stdout()).await?;

        state.db.inner().close().await;
        info!("Shutting down");
        Ok::<(), Box<dyn Error>>(())
    })
}

/// Initializes the tracing subscriber.
///
/// Output goes to stderr; stdout carries only bridge responses.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=dukkan=trace` - Show trace for dukkan crates only
/// - Default: `info,dukkan=debug,sqlx=warn`
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,dukkan=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Determines the database file path.
///
/// ## Platform-Specific Paths
/// - **macOS**: `~/Library/Application Support/com.dukkan.pos/pos.db`
/// - **Windows**: `%APPDATA%\dukkan\pos\data\pos.db`
/// - **Linux**: `~/.local/share/pos/pos.db`
///
/// ## Development Override
/// Set `DUKKAN_DB_PATH` to use a custom path.
fn get_database_path() -> Result<PathBuf, Box<dyn Error>> {
    if let Ok(path) = std::env::var("DUKKAN_DB_PATH") {
        return Ok(PathBuf::from(path));
    }

    let proj_dirs = ProjectDirs::from("com", "dukkan", "pos")
        .ok_or("Could not determine app data directory")?;

    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)?;

    Ok(data_dir.join("pos.db"))
}
