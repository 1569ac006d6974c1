/// Session Module
///
/// A session is the state threaded through a pipeline: the connection, the
/// current prepared statement and the result of its latest execution. Every
/// transition consumes the session and returns a new one, so a statement or
/// cursor is owned by exactly one snapshot at a time and released as soon as
/// that snapshot is superseded or dropped.
use crate::core::db::rows::{RowSet, Rows};
use crate::core::db::statement::StatementHandle;
use crate::core::driver::{Connection, CursorOf};
use crate::core::error::TemplateError;
use crate::core::try_result::Try;
use crate::core::value::{Row, Value};
use crate::operation::Operation;
use std::iter::Flatten;
use std::option;
use tracing::debug;

/// Rows of a session's current result; empty when nothing was executed.
pub type SessionRows<'a, Cu> = Flatten<option::IntoIter<Rows<'a, Cu>>>;

/// Which of the session's slots are populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Connection only
    Connected,
    /// Connection and a prepared statement
    Prepared,
    /// Connection, statement and a result of its latest execution
    Executed,
}

pub struct Session<'c, C>
where
    C: Connection + 'c,
{
    connection: &'c C,
    // Declared before the statement so the cursor is dropped first.
    result: Option<RowSet<CursorOf<'c, C>>>,
    statement: Option<StatementHandle<C::Statement<'c>>>,
}

impl<'c, C> Session<'c, C>
where
    C: Connection + 'c,
{
    /// Creates the initial session around a live connection.
    pub fn new(connection: &'c C) -> Self {
        Session {
            connection,
            statement: None,
            result: None,
        }
    }

    pub fn connection(&self) -> &'c C {
        self.connection
    }

    pub fn state(&self) -> SessionState {
        match (&self.statement, &self.result) {
            (None, _) => SessionState::Connected,
            (Some(_), None) => SessionState::Prepared,
            (Some(_), Some(_)) => SessionState::Executed,
        }
    }

    pub fn has_statement(&self) -> bool {
        self.statement.is_some()
    }

    pub fn has_result(&self) -> bool {
        self.result.is_some()
    }

    /// Enables auto-commit, then commits.
    pub fn auto_commit(self) -> Try<Self> {
        self.set_auto_commit(true)
    }

    /// Disables auto-commit, then commits.
    pub fn no_auto_commit(self) -> Try<Self> {
        self.set_auto_commit(false)
    }

    fn set_auto_commit(self, enabled: bool) -> Try<Self> {
        debug!(enabled, "setting auto-commit");
        Try::of(|| {
            self.connection
                .set_auto_commit(enabled)
                .map_err(|e| TemplateError::driver("failed to set auto-commit", e))?;
            self.connection
                .commit()
                .map_err(|e| TemplateError::driver("failed to commit", e))?;
            Ok::<_, TemplateError>(self)
        })
    }

    pub fn commit(self) -> Try<Self> {
        debug!("committing");
        Try::of(|| {
            self.connection
                .commit()
                .map_err(|e| TemplateError::driver("failed to commit", e))?;
            Ok::<_, TemplateError>(self)
        })
    }

    pub fn rollback(self) -> Try<Self> {
        debug!("rolling back");
        Try::of(|| {
            self.connection
                .rollback()
                .map_err(|e| TemplateError::driver("failed to roll back", e))?;
            Ok::<_, TemplateError>(self)
        })
    }

    /// Replaces the current statement with a newly prepared one.
    ///
    /// The previous statement and its result are released first; the new
    /// session has no result.
    pub fn prepare_statement(self, sql: &str) -> Try<Self> {
        let Session {
            connection,
            statement,
            result,
        } = self;
        drop(result);
        if let Some(statement) = statement {
            statement.close();
        }
        debug!(sql, "preparing statement");
        Try::of(|| {
            let statement = connection
                .prepare_statement(sql)
                .map_err(|e| TemplateError::driver("failed to prepare statement", e))?;
            Ok::<_, TemplateError>(Session {
                connection,
                statement: Some(StatementHandle::new(statement)),
                result: None,
            })
        })
    }

    /// Executes the current statement as a mutation with `params`.
    ///
    /// Fails with [`TemplateError::StatementNotFound`] when nothing is
    /// prepared.
    pub fn execute_update(self, params: &[Value]) -> Try<Self> {
        let Session {
            connection,
            statement,
            result,
        } = self;
        drop(result);
        let Some(mut statement) = statement else {
            return Try::failure(TemplateError::StatementNotFound);
        };
        statement.execute_update(params).map(|count| Session {
            connection,
            statement: Some(statement),
            result: Some(RowSet::update(count)),
        })
    }

    /// Executes the current statement as a query with `params`.
    ///
    /// Fails with [`TemplateError::StatementNotFound`] when nothing is
    /// prepared.
    pub fn execute_query(self, params: &[Value]) -> Try<Self> {
        let Session {
            connection,
            statement,
            result,
        } = self;
        drop(result);
        let Some(mut statement) = statement else {
            return Try::failure(TemplateError::StatementNotFound);
        };
        statement.execute_query(params).map(|cursor| Session {
            connection,
            statement: Some(statement),
            result: Some(RowSet::query(cursor)),
        })
    }

    /// Reads the current result into memory.
    ///
    /// The returned session holds the rows as a buffered result, still
    /// readable once. A session with no result is returned unchanged.
    pub fn fetch(mut self) -> Try<Self> {
        if let Some(mut result) = self.result.take() {
            self.result = Some(RowSet::buffered(result.values()));
        }
        Try::success(self)
    }

    /// Applies `operation` to this session.
    pub fn execute(self, operation: &Operation<C>) -> Try<Self>
    where
        C: 'static,
    {
        operation.apply(self)
    }

    /// Remaining rows of the current result, or none if nothing was
    /// executed.
    pub fn stream(&mut self) -> SessionRows<'_, CursorOf<'c, C>> {
        self.result.as_mut().map(RowSet::stream).into_iter().flatten()
    }

    pub fn values(&mut self) -> Vec<Row> {
        self.stream().collect()
    }
}
