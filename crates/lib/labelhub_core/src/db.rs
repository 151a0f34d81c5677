//! SQLite database management.
//!
//! Provides `connect` for building the shared connection pool. Every
//! component receives the pool at construction; there is no global handle.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use thiserror::Error;

/// Default database file name inside the application data directory.
const DEFAULT_DATABASE_FILE: &str = "labelhub.db";

/// How long a connection waits on a locked database before giving up.
///
/// SQLite serializes writers; concurrent claims and rotations queue on this.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Maximum time to wait for a pooled connection.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur while opening or preparing the database.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Data directory not available")]
    NoDataDir,
}

/// Result type for database operations.
pub type Result<T> = std::result::Result<T, DbError>;

/// Open a connection pool for the given `sqlite:` URL.
///
/// The database file is created if missing. Connections run in WAL mode with
/// foreign keys enforced, so token pairs and samples cascade with their owners.
pub async fn connect(url: &str, max_connections: u32) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect_with(options)
        .await?;

    tracing::debug!(max_connections, "database pool ready");
    Ok(pool)
}

/// Returns the `sqlite:` URL of the default on-disk database, creating its
/// parent directory when needed.
pub fn default_database_url() -> Result<String> {
    let dir = default_data_dir().ok_or(DbError::NoDataDir)?;
    std::fs::create_dir_all(&dir)?;
    Ok(format!(
        "sqlite://{}",
        dir.join(DEFAULT_DATABASE_FILE).display()
    ))
}

/// Returns the default data directory for the database file.
///
/// Platform paths:
/// - macOS: `~/Library/Application Support/labelhub`
/// - Linux: `~/.local/share/labelhub`
/// - Windows: `%APPDATA%\labelhub`
pub fn default_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("labelhub"))
}

/// Decode an optional JSON text column. A stored JSON `null` reads as `None`.
pub(crate) fn decode_json(
    raw: Option<String>,
) -> std::result::Result<Option<serde_json::Value>, sqlx::Error> {
    match raw {
        None => Ok(None),
        Some(text) => {
            let value: serde_json::Value =
                serde_json::from_str(&text).map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
            Ok((!value.is_null()).then_some(value))
        }
    }
}
