/// Operation Module
///
/// An [`Operation`] is an immutable function from a [`Session`] to
/// `Try<Session>`. Operations chain with [`Operation::and_then`], which only
/// runs the next step when the previous one succeeded, so a pipeline stops
/// at its first failure and hands that failure back unchanged.
use crate::core::db::session::Session;
use crate::core::driver::Connection;
use crate::core::try_result::Try;
use crate::core::value::{Row, Value};
use std::fmt;
use std::rc::Rc;
use tracing::debug;

type Step<C> = dyn for<'c> Fn(Session<'c, C>) -> Try<Session<'c, C>>;

/// A composable unit of work over a session.
///
/// Cloning is cheap and clones share the same steps. Building on an
/// operation never changes it, so one operation can back several pipelines
/// and be applied any number of times.
pub struct Operation<C: Connection + 'static> {
    step: Rc<Step<C>>,
}

impl<C: Connection + 'static> Operation<C> {
    pub fn new<F>(step: F) -> Self
    where
        F: for<'c> Fn(Session<'c, C>) -> Try<Session<'c, C>> + 'static,
    {
        Operation {
            step: Rc::new(step),
        }
    }

    /// The operation that returns its input session unchanged.
    pub fn identity() -> Self {
        Operation::new(|session| Try::success(session))
    }

    /// Starting point for a chain of verbs; same as [`Operation::identity`].
    pub fn begin() -> Self {
        Operation::identity()
    }

    pub fn apply<'c>(&self, session: Session<'c, C>) -> Try<Session<'c, C>> {
        (self.step)(session)
    }

    /// Runs `self`, then `next` on the resulting session.
    ///
    /// When `self` fails, `next` is never invoked and the failure is
    /// returned as is.
    pub fn and_then(&self, next: &Operation<C>) -> Operation<C> {
        let first = self.clone();
        let second = next.clone();
        Operation::new(move |session| first.apply(session).flat_map(|session| second.apply(session)))
    }

    /// Appends a step given as a closure.
    pub fn then<F>(&self, step: F) -> Operation<C>
    where
        F: for<'c> Fn(Session<'c, C>) -> Try<Session<'c, C>> + 'static,
    {
        self.and_then(&Operation::new(step))
    }

    /// Runs `self` and shows a successful session to `observer`.
    ///
    /// The observer only looks: its effects are not part of the result, and
    /// a panic inside it is not caught.
    pub fn peek<F>(&self, observer: F) -> Operation<C>
    where
        F: Fn(&Session<'_, C>) + 'static,
    {
        let inner = self.clone();
        Operation::new(move |session| {
            let result = inner.apply(session);
            result.if_present(|session| observer(session));
            result
        })
    }

    pub fn auto_commit(&self) -> Operation<C> {
        self.then(|session| session.auto_commit())
    }

    pub fn no_auto_commit(&self) -> Operation<C> {
        self.then(|session| session.no_auto_commit())
    }

    pub fn commit(&self) -> Operation<C> {
        self.then(|session| session.commit())
    }

    pub fn rollback(&self) -> Operation<C> {
        self.then(|session| session.rollback())
    }

    pub fn prepare_statement(&self, sql: impl Into<String>) -> Operation<C> {
        let sql = sql.into();
        self.then(move |session| session.prepare_statement(&sql))
    }

    pub fn execute_update(&self, params: Vec<Value>) -> Operation<C> {
        self.then(move |session| session.execute_update(&params))
    }

    pub fn execute_query(&self, params: Vec<Value>) -> Operation<C> {
        self.then(move |session| session.execute_query(&params))
    }

    /// Buffers the current result in memory.
    pub fn fetch(&self) -> Operation<C> {
        self.then(|session| session.fetch())
    }

    /// Applies the operation to a fresh session on `connection` and reads
    /// the final result into rows.
    ///
    /// The session and everything it owns is released before this returns,
    /// on success and on failure.
    pub fn run(&self, connection: &C) -> Try<Vec<Row>> {
        debug!("running operation");
        self.apply(Session::new(connection))
            .map(|mut session| session.values())
            .on_failure(|e| debug!(error = %e, "operation failed"))
    }
}

impl<C: Connection + 'static> Clone for Operation<C> {
    fn clone(&self) -> Self {
        Operation {
            step: Rc::clone(&self.step),
        }
    }
}

impl<C: Connection + 'static> Default for Operation<C> {
    fn default() -> Self {
        Operation::identity()
    }
}

impl<C: Connection + 'static> fmt::Debug for Operation<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation").finish_non_exhaustive()
    }
}
