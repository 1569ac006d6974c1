/// SQLite Connection Module
///
/// Implements the driver [`Connection`] capability on top of rusqlite,
/// including auto-commit emulation: SQLite has no connection-level flag, so
/// manual-commit mode is kept by always holding an open transaction.
use crate::core::db::query::SqliteStatement;
use crate::core::driver::Connection;
use crate::core::error::{Result, TemplateError};
use std::cell::Cell;
use std::path::Path;
use tracing::debug;

/// Represents database transaction states
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransactionState {
    /// No active transaction (autocommit mode)
    Autocommit,
    /// Transaction in progress
    Transaction,
}

/// A SQLite connection usable as the live connection of a pipeline.
#[derive(Debug)]
pub struct SqliteConnection {
    inner: rusqlite::Connection,
    /// Path to the database file (None for in-memory databases)
    current_path: Option<String>,
    auto_commit: Cell<bool>,
}

impl SqliteConnection {
    /// Opens the SQLite database at `db_path`, or ":memory:" for an
    /// in-memory database.
    pub fn open(db_path: &str) -> Result<Self> {
        let conn = if db_path == ":memory:" {
            rusqlite::Connection::open_in_memory()
        } else {
            rusqlite::Connection::open(Path::new(db_path))
        }
        .map_err(|e| TemplateError::driver(format!("failed to open {}", db_path), e))?;

        let mut connection = Self::from_connection(conn)?;
        if db_path != ":memory:" {
            connection.current_path = Some(db_path.to_string());
        }
        debug!(path = db_path, "opened database");
        Ok(connection)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::open(":memory:")
    }

    /// Wraps an already open rusqlite connection.
    pub fn from_connection(conn: rusqlite::Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(|e| TemplateError::driver("failed to initialize connection", e))?;
        let auto_commit = conn.is_autocommit();
        Ok(SqliteConnection {
            inner: conn,
            current_path: None,
            auto_commit: Cell::new(auto_commit),
        })
    }

    pub fn raw(&self) -> &rusqlite::Connection {
        &self.inner
    }

    pub fn current_path(&self) -> Option<&str> {
        self.current_path.as_deref()
    }

    pub fn is_auto_commit(&self) -> bool {
        self.auto_commit.get()
    }

    pub fn transaction_state(&self) -> TransactionState {
        if self.inner.is_autocommit() {
            TransactionState::Autocommit
        } else {
            TransactionState::Transaction
        }
    }

    // Ends the open transaction, if any, and reopens one in manual mode.
    fn end_transaction(&self, verb: &str) -> rusqlite::Result<()> {
        if !self.inner.is_autocommit() {
            self.inner.execute_batch(verb)?;
        }
        if !self.auto_commit.get() {
            self.inner.execute_batch("BEGIN")?;
        }
        Ok(())
    }
}

impl Connection for SqliteConnection {
    type Error = rusqlite::Error;
    type Statement<'c> = SqliteStatement<'c> where Self: 'c;

    fn set_auto_commit(&self, enabled: bool) -> rusqlite::Result<()> {
        if enabled {
            if !self.inner.is_autocommit() {
                self.inner.execute_batch("COMMIT")?;
            }
        } else if self.inner.is_autocommit() {
            self.inner.execute_batch("BEGIN")?;
        }
        self.auto_commit.set(enabled);
        Ok(())
    }

    fn commit(&self) -> rusqlite::Result<()> {
        self.end_transaction("COMMIT")
    }

    fn rollback(&self) -> rusqlite::Result<()> {
        self.end_transaction("ROLLBACK")
    }

    // Exactly one statement: empty SQL and trailing statements are rejected
    // instead of being skipped.
    fn prepare_statement<'c>(&'c self, sql: &str) -> rusqlite::Result<SqliteStatement<'c>> {
        let mut batch = rusqlite::Batch::new(&self.inner, sql);
        let Some(statement) = batch.next()? else {
            return Err(misuse("SQL contains no statement"));
        };
        if batch.next()?.is_some() {
            return Err(misuse("SQL contains more than one statement"));
        }
        Ok(SqliteStatement::new(statement))
    }
}

fn misuse(message: &str) -> rusqlite::Error {
    rusqlite::Error::SqliteFailure(
        rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_MISUSE),
        Some(message.to_string()),
    )
}
