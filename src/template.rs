/// Template Module
///
/// Fluent facade over [`Operation`]: a builder that appends one step per
/// verb, and the built [`Template`] that runs against a connection.
use crate::core::db::session::Session;
use crate::core::driver::Connection;
use crate::core::try_result::Try;
use crate::core::value::{Row, Value};
use crate::operation::Operation;
use tracing::debug;

/// Builds a [`Template`] one step at a time.
///
/// Every verb returns a new builder and leaves the receiver untouched, so a
/// common prefix can be shared between templates.
pub struct TemplateBuilder<C: Connection + 'static> {
    operation: Operation<C>,
}

impl<C: Connection + 'static> TemplateBuilder<C> {
    /// Creates an empty pipeline.
    pub fn new() -> Self {
        Self::create(Operation::identity())
    }

    fn create(operation: Operation<C>) -> Self {
        TemplateBuilder { operation }
    }

    /// Appends set auto-commit on (with the implicit commit).
    pub fn auto_commit(&self) -> Self {
        Self::create(self.operation.auto_commit())
    }

    /// Appends set auto-commit off (with the implicit commit).
    pub fn no_auto_commit(&self) -> Self {
        Self::create(self.operation.no_auto_commit())
    }

    pub fn commit(&self) -> Self {
        Self::create(self.operation.commit())
    }

    pub fn rollback(&self) -> Self {
        Self::create(self.operation.rollback())
    }

    /// Appends preparing `sql`, replacing the current statement.
    pub fn statement(&self, sql: impl Into<String>) -> Self {
        Self::create(self.operation.prepare_statement(sql))
    }

    /// Appends executing the current statement as an update, no parameters.
    pub fn update(&self) -> Self {
        self.update_with(Vec::new())
    }

    pub fn update_with(&self, params: Vec<Value>) -> Self {
        Self::create(self.operation.execute_update(params))
    }

    /// Appends executing the current statement as a query, no parameters.
    pub fn query(&self) -> Self {
        self.query_with(Vec::new())
    }

    pub fn query_with(&self, params: Vec<Value>) -> Self {
        Self::create(self.operation.execute_query(params))
    }

    /// Appends an observation hook, see [`Operation::peek`].
    pub fn peek<F>(&self, observer: F) -> Self
    where
        F: Fn(&Session<'_, C>) + 'static,
    {
        Self::create(self.operation.peek(observer))
    }

    /// Appends a custom operation.
    pub fn then(&self, operation: &Operation<C>) -> Self {
        Self::create(self.operation.and_then(operation))
    }

    pub fn build(&self) -> Template<C> {
        Template {
            operation: self.operation.clone(),
        }
    }
}

impl<C: Connection + 'static> Default for TemplateBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Connection + 'static> Clone for TemplateBuilder<C> {
    fn clone(&self) -> Self {
        Self::create(self.operation.clone())
    }
}

/// A built pipeline, ready to run against any number of connections.
///
/// ```
/// use sqlchain::{params, SqliteConnection, Template};
///
/// let template = Template::<SqliteConnection>::builder()
///     .statement("CREATE TABLE TEST (ID INTEGER PRIMARY KEY, NAME TEXT)")
///     .update()
///     .statement("INSERT INTO TEST (ID, NAME) VALUES (?, ?)")
///     .update_with(params![1, "A"])
///     .statement("SELECT * FROM TEST")
///     .query()
///     .build();
///
/// let conn = SqliteConnection::open_in_memory().unwrap();
/// let rows = template.apply(&conn).get().unwrap();
/// assert_eq!(rows, vec![params![1, "A"]]);
/// ```
pub struct Template<C: Connection + 'static> {
    operation: Operation<C>,
}

impl<C: Connection + 'static> Template<C> {
    pub fn builder() -> TemplateBuilder<C> {
        TemplateBuilder::new()
    }

    /// Runs the pipeline on `connection` and returns the rows of the last
    /// result, or the first failure.
    pub fn apply(&self, connection: &C) -> Try<Vec<Row>> {
        debug!("applying template");
        self.operation.run(connection)
    }

    pub fn operation(&self) -> &Operation<C> {
        &self.operation
    }
}

impl<C: Connection + 'static> Clone for Template<C> {
    fn clone(&self) -> Self {
        Template {
            operation: self.operation.clone(),
        }
    }
}
