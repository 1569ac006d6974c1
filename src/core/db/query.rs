/// SQLite Statement Module
///
/// Prepared statements and result cursors for [`SqliteConnection`].
///
/// [`SqliteConnection`]: crate::core::db::connection::SqliteConnection
use crate::core::driver::{Cursor, Statement};
use crate::core::value::{Row, Value};
use rusqlite::ffi;
use rusqlite::types::{ToSql, ToSqlOutput, ValueRef};
use std::collections::VecDeque;
use tracing::debug;

/// A prepared SQLite statement. Finalized on release or drop.
pub struct SqliteStatement<'c> {
    inner: Option<rusqlite::Statement<'c>>,
}

impl<'c> SqliteStatement<'c> {
    pub(crate) fn new(inner: rusqlite::Statement<'c>) -> Self {
        SqliteStatement { inner: Some(inner) }
    }

    fn statement(&mut self) -> rusqlite::Result<&mut rusqlite::Statement<'c>> {
        self.inner.as_mut().ok_or_else(|| {
            rusqlite::Error::SqliteFailure(
                ffi::Error::new(ffi::SQLITE_MISUSE),
                Some("statement already released".to_string()),
            )
        })
    }
}

impl Statement for SqliteStatement<'_> {
    type Error = rusqlite::Error;
    type Cursor = SqliteCursor;

    fn bind_parameter(&mut self, index: usize, value: &Value) -> rusqlite::Result<()> {
        let stmt = self.statement()?;
        let count = stmt.parameter_count();
        if index == 0 || index > count {
            return Err(rusqlite::Error::InvalidParameterCount(index, count));
        }
        stmt.raw_bind_parameter(index, value)
    }

    fn execute_for_effect(&mut self) -> rusqlite::Result<u64> {
        let changed = self.statement()?.raw_execute()?;
        Ok(changed as u64)
    }

    // Rows are stepped eagerly. A failure on the first step is an execution
    // error; later failures are kept in place for the cursor to report.
    fn execute_for_rows(&mut self) -> rusqlite::Result<SqliteCursor> {
        let stmt = self.statement()?;
        let column_count = stmt.column_count();
        let mut rows = stmt.raw_query();
        let mut buffered = VecDeque::new();
        loop {
            match rows.next() {
                Ok(Some(row)) => match read_row(row, column_count) {
                    Ok(values) => buffered.push_back(Ok(values)),
                    Err(e) => {
                        buffered.push_back(Err(e));
                        break;
                    }
                },
                Ok(None) => break,
                Err(e) if buffered.is_empty() => return Err(e),
                Err(e) => {
                    buffered.push_back(Err(e));
                    break;
                }
            }
        }
        Ok(SqliteCursor::new(buffered, column_count))
    }

    fn release(&mut self) {
        if let Some(stmt) = self.inner.take() {
            if let Err(e) = stmt.finalize() {
                debug!(error = %e, "statement finalize failed");
            }
        }
    }
}

fn read_row(row: &rusqlite::Row<'_>, column_count: usize) -> rusqlite::Result<Row> {
    let mut values = Vec::with_capacity(column_count);
    for i in 0..column_count {
        values.push(to_value(row.get_ref(i)?));
    }
    Ok(values)
}

/// Rows of an executed SQLite query.
#[derive(Debug)]
pub struct SqliteCursor {
    rows: VecDeque<rusqlite::Result<Row>>,
    current: Option<Row>,
    column_count: usize,
}

impl SqliteCursor {
    fn new(rows: VecDeque<rusqlite::Result<Row>>, column_count: usize) -> Self {
        SqliteCursor {
            rows,
            current: None,
            column_count,
        }
    }
}

impl Cursor for SqliteCursor {
    type Error = rusqlite::Error;

    fn advance(&mut self) -> rusqlite::Result<bool> {
        match self.rows.pop_front() {
            Some(Ok(row)) => {
                self.current = Some(row);
                Ok(true)
            }
            Some(Err(e)) => {
                self.release();
                Err(e)
            }
            None => {
                self.current = None;
                Ok(false)
            }
        }
    }

    fn column_count(&self) -> usize {
        self.column_count
    }

    fn column_value(&self, index: usize) -> rusqlite::Result<Value> {
        self.current
            .as_ref()
            .and_then(|row| row.get(index))
            .cloned()
            .ok_or(rusqlite::Error::InvalidColumnIndex(index))
    }

    fn release(&mut self) {
        self.rows.clear();
        self.current = None;
    }
}

/// Maps a SQLite storage class to a [`Value`].
fn to_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(f) => Value::Real(f),
        ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).to_string()),
        ValueRef::Blob(b) => Value::Blob(b.to_vec()),
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        let value = match self {
            Value::Null => ValueRef::Null,
            Value::Integer(i) => ValueRef::Integer(*i),
            Value::Real(f) => ValueRef::Real(*f),
            Value::Text(t) => ValueRef::Text(t.as_bytes()),
            Value::Blob(b) => ValueRef::Blob(b),
        };
        Ok(ToSqlOutput::Borrowed(value))
    }
}
