/// Result Set Adapter Module
///
/// A uniform, single-pass row sequence over either a live query cursor or
/// the synthetic one-row result of an update.
use crate::core::driver::Cursor;
use crate::core::value::{Row, Value};
use std::collections::VecDeque;
use tracing::debug;

/// Rows produced by the most recent execution of a statement.
pub enum RowSet<Cu: Cursor> {
    /// Backed by a query cursor
    Query(QueryRows<Cu>),
    /// A single row holding the affected-row count, until consumed
    Update(Option<u64>),
    /// Rows already read into memory
    Buffered(VecDeque<Row>),
}

impl<Cu: Cursor> RowSet<Cu> {
    pub fn query(cursor: Cu) -> Self {
        RowSet::Query(QueryRows::new(cursor))
    }

    pub fn update(count: u64) -> Self {
        RowSet::Update(Some(count))
    }

    pub fn buffered(rows: Vec<Row>) -> Self {
        RowSet::Buffered(rows.into())
    }

    /// Lazy, forward-only rows. Reading again after exhaustion yields
    /// nothing.
    pub fn stream(&mut self) -> Rows<'_, Cu> {
        Rows { set: self }
    }

    /// Reads all remaining rows.
    pub fn values(&mut self) -> Vec<Row> {
        self.stream().collect()
    }

    fn next_row(&mut self) -> Option<Row> {
        match self {
            RowSet::Query(rows) => rows.next_row(),
            RowSet::Update(count) => count
                .take()
                .map(|n| vec![Value::Integer(i64::try_from(n).unwrap_or(i64::MAX))]),
            RowSet::Buffered(rows) => rows.pop_front(),
        }
    }
}

/// Iterator returned by [`RowSet::stream`].
pub struct Rows<'a, Cu: Cursor> {
    set: &'a mut RowSet<Cu>,
}

impl<Cu: Cursor> Iterator for Rows<'_, Cu> {
    type Item = Row;

    fn next(&mut self) -> Option<Row> {
        self.set.next_row()
    }
}

/// Exclusive owner of a query cursor.
pub struct QueryRows<Cu: Cursor> {
    cursor: Cu,
    exhausted: bool,
}

impl<Cu: Cursor> QueryRows<Cu> {
    fn new(cursor: Cu) -> Self {
        QueryRows {
            cursor,
            exhausted: false,
        }
    }

    // Fetch errors end the sequence like end-of-data.
    fn next_row(&mut self) -> Option<Row> {
        if self.exhausted {
            return None;
        }
        match self.fetch() {
            Ok(Some(row)) => Some(row),
            Ok(None) => {
                self.finish();
                None
            }
            Err(e) => {
                debug!(error = %e, "fetch failed, treating as end of data");
                self.finish();
                None
            }
        }
    }

    fn fetch(&mut self) -> Result<Option<Row>, Cu::Error> {
        if !self.cursor.advance()? {
            return Ok(None);
        }
        let count = self.cursor.column_count();
        let mut row = Vec::with_capacity(count);
        for index in 0..count {
            row.push(self.cursor.column_value(index)?);
        }
        Ok(Some(row))
    }

    fn finish(&mut self) {
        if !self.exhausted {
            self.exhausted = true;
            self.cursor.release();
        }
    }
}

impl<Cu: Cursor> Drop for QueryRows<Cu> {
    fn drop(&mut self) {
        self.finish();
    }
}
