/// Driver Capability Module
///
/// The narrow interface a pipeline needs from a physical database driver.
/// Connections hand out prepared statements, statements bind 1-based
/// parameters and execute, and queries yield forward-only cursors.
///
/// A SQLite implementation lives in [`crate::core::db::connection`].
use crate::core::value::Value;
use std::error::Error;

/// A live database connection.
pub trait Connection {
    /// Native error type shared by the connection, its statements and cursors.
    type Error: Error + Send + Sync + 'static;

    /// Prepared statement type, which may borrow the connection.
    type Statement<'c>: Statement<Error = Self::Error>
    where
        Self: 'c;

    fn set_auto_commit(&self, enabled: bool) -> Result<(), Self::Error>;

    fn commit(&self) -> Result<(), Self::Error>;

    fn rollback(&self) -> Result<(), Self::Error>;

    /// Fails on malformed SQL or I/O error.
    fn prepare_statement<'c>(&'c self, sql: &str) -> Result<Self::Statement<'c>, Self::Error>;
}

/// A prepared statement owned by exactly one holder.
pub trait Statement {
    type Error: Error + Send + Sync + 'static;
    type Cursor: Cursor<Error = Self::Error>;

    /// Binds `value` to the placeholder at `index`, counting from 1.
    fn bind_parameter(&mut self, index: usize, value: &Value) -> Result<(), Self::Error>;

    /// Executes a mutation and returns the affected-row count.
    fn execute_for_effect(&mut self) -> Result<u64, Self::Error>;

    fn execute_for_rows(&mut self) -> Result<Self::Cursor, Self::Error>;

    /// Releases driver resources. Idempotent.
    fn release(&mut self);
}

/// A forward-only row cursor.
pub trait Cursor {
    type Error: Error + Send + Sync + 'static;

    /// Moves to the next row; `false` at end of data.
    fn advance(&mut self) -> Result<bool, Self::Error>;

    fn column_count(&self) -> usize;

    /// Value of the current row at `index`, counting from 0.
    fn column_value(&self, index: usize) -> Result<Value, Self::Error>;

    /// Releases driver resources. Idempotent.
    fn release(&mut self);
}

/// Cursor type produced by statements of connection `C`.
pub type CursorOf<'c, C> = <<C as Connection>::Statement<'c> as Statement>::Cursor;
