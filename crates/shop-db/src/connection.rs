//! Database connection management.
//!
//! The engine never owns a pool. Callers open (or check out) one
//! [`DbConnection`] per request and lend it to the repositories as
//! `&mut SqliteConnection`; dropping the wrapper releases the connection.

use std::{path::Path, time::Duration};

use diesel::{sql_query, Connection, RunQueryDsl, SqliteConnection};
use tracing::debug;

use crate::{
    error::{DbError, Result},
    migration::apply_migrations,
};

/// Options applied to every connection right after it is established.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionOptions {
    /// How long SQLite waits on a locked database before giving up.
    pub busy_timeout: Duration,
    /// Whether embedded migrations are run on open.
    pub migrate: bool,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            busy_timeout: Duration::from_secs(5),
            migrate: true,
        }
    }
}

/// Database connection wrapper with migration support.
pub struct DbConnection {
    conn: SqliteConnection,
}

impl DbConnection {
    /// Opens a database connection and runs migrations.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails, a pragma cannot be applied
    /// or migrations fail.
    pub fn open<P: AsRef<Path>>(path: P, options: ConnectionOptions) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let path_str = path.as_ref().to_string_lossy();
        let mut conn = SqliteConnection::establish(&path_str)?;

        // WAL mode for better concurrent access
        sql_query("PRAGMA journal_mode = WAL;")
            .execute(&mut conn)
            .map_err(|e| DbError::ConnectionError(e.to_string()))?;

        // Cascades from parents to owned children depend on this
        sql_query("PRAGMA foreign_keys = ON;")
            .execute(&mut conn)
            .map_err(|e| DbError::ConnectionError(e.to_string()))?;

        sql_query(format!(
            "PRAGMA busy_timeout = {};",
            options.busy_timeout.as_millis()
        ))
        .execute(&mut conn)
        .map_err(|e| DbError::ConnectionError(e.to_string()))?;

        if options.migrate {
            apply_migrations(&mut conn).map_err(|e| DbError::MigrationError(e.to_string()))?;
        }

        debug!(path = %path_str, "opened database");
        Ok(Self { conn })
    }

    /// Opens a database connection without running migrations.
    ///
    /// Use this when you know the database is already migrated.
    pub fn open_without_migrations<P: AsRef<Path>>(path: P, busy_timeout: Duration) -> Result<Self> {
        Self::open(
            path,
            ConnectionOptions {
                busy_timeout,
                migrate: false,
            },
        )
    }

    /// Gets a mutable reference to the underlying connection.
    pub fn conn(&mut self) -> &mut SqliteConnection {
        &mut self.conn
    }
}

impl std::ops::Deref for DbConnection {
    type Target = SqliteConnection;

    fn deref(&self) -> &Self::Target {
        &self.conn
    }
}

impl std::ops::DerefMut for DbConnection {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.conn
    }
}
