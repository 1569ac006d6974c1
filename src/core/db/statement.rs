/// Statement Handle Module
///
/// Exclusive owner of one prepared statement. Binding is all-or-nothing and
/// the underlying statement is released exactly once, when the handle is
/// closed or dropped.
use crate::core::driver::Statement;
use crate::core::error::TemplateError;
use crate::core::try_result::Try;
use crate::core::value::Value;
use tracing::{debug, trace};

pub struct StatementHandle<S: Statement> {
    inner: S,
    released: bool,
}

impl<S: Statement> StatementHandle<S> {
    pub fn new(inner: S) -> Self {
        StatementHandle {
            inner,
            released: false,
        }
    }

    /// Binds `params` in order and executes the statement as a mutation.
    ///
    /// Returns the affected-row count. No execution happens if any
    /// parameter fails to bind.
    pub fn execute_update(&mut self, params: &[Value]) -> Try<u64> {
        Try::of(|| {
            self.bind_parameters(params)?;
            let count = self
                .inner
                .execute_for_effect()
                .map_err(|e| TemplateError::driver("failed to execute update", e))?;
            debug!(affected = count, "update executed");
            Ok::<_, TemplateError>(count)
        })
    }

    /// Binds `params` in order and executes the statement as a query.
    pub fn execute_query(&mut self, params: &[Value]) -> Try<S::Cursor> {
        Try::of(|| {
            self.bind_parameters(params)?;
            let cursor = self
                .inner
                .execute_for_rows()
                .map_err(|e| TemplateError::driver("failed to execute query", e))?;
            debug!("query executed");
            Ok::<_, TemplateError>(cursor)
        })
    }

    fn bind_parameters(&mut self, params: &[Value]) -> Result<(), TemplateError> {
        for (position, value) in params.iter().enumerate() {
            let index = position + 1;
            trace!(index, kind = value.type_name(), "binding parameter");
            self.inner.bind_parameter(index, value).map_err(|e| {
                TemplateError::driver(format!("failed to bind parameter {}", index), e)
            })?;
        }
        Ok(())
    }

    /// Releases the statement now instead of at drop.
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.inner.release();
        }
    }
}

impl<S: Statement> Drop for StatementHandle<S> {
    fn drop(&mut self) {
        self.release();
    }
}
