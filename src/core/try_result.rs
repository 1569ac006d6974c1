/// Try Module
///
/// A two-variant container for success-with-value or failure-with-error that
/// every pipeline step returns. Emptiness is explicit: the success side holds
/// an `Option`, and an empty success behaves as "not present" everywhere a
/// value is consumed.
use crate::core::error::{Cause, TemplateError};
use std::fmt;

/// Success or failure of a pipeline step.
///
/// Once a value is a failure, `map`, `flat_map` and friends hand the same
/// error through without invoking the supplied function.
pub struct Try<V, E = TemplateError> {
    inner: Result<Option<V>, E>,
}

impl<V, E> Try<V, E> {
    pub fn success(value: V) -> Self {
        Try { inner: Ok(Some(value)) }
    }

    pub fn failure(error: E) -> Self {
        Try { inner: Err(error) }
    }

    /// A success that holds no value.
    pub fn empty() -> Self {
        Try { inner: Ok(None) }
    }

    /// Lifts an optional value; `None` becomes an empty success.
    pub fn of_option(value: Option<V>) -> Self {
        Try { inner: Ok(value) }
    }

    /// Runs `callable`, capturing its error as a failure.
    pub fn of<F, X>(callable: F) -> Self
    where
        F: FnOnce() -> Result<V, X>,
        X: Into<E>,
    {
        match callable() {
            Ok(value) => Try::success(value),
            Err(e) => Try::failure(e.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.inner.is_ok()
    }

    pub fn is_failure(&self) -> bool {
        self.inner.is_err()
    }

    /// True only for a success that holds a value.
    pub fn is_present(&self) -> bool {
        matches!(self.inner, Ok(Some(_)))
    }

    pub fn map<R, F>(self, func: F) -> Try<R, E>
    where
        F: FnOnce(V) -> R,
    {
        Try {
            inner: self.inner.map(|value| value.map(func)),
        }
    }

    /// Like `map`, but an error returned by `func` turns into a failure.
    pub fn try_map<R, F, X>(self, func: F) -> Try<R, E>
    where
        F: FnOnce(V) -> Result<R, X>,
        X: Into<E>,
    {
        self.flat_map(|value| Try::of(|| func(value)))
    }

    pub fn flat_map<R, F>(self, func: F) -> Try<R, E>
    where
        F: FnOnce(V) -> Try<R, E>,
    {
        match self.inner {
            Ok(Some(value)) => func(value),
            Ok(None) => Try::empty(),
            Err(e) => Try::failure(e),
        }
    }

    /// Like `flat_map` for functions returning a plain `Result`.
    pub fn and_then_result<R, F, X>(self, func: F) -> Try<R, E>
    where
        F: FnOnce(V) -> Result<R, X>,
        X: Into<E>,
    {
        self.try_map(func)
    }

    pub fn map_err<E2, F>(self, func: F) -> Try<V, E2>
    where
        F: FnOnce(E) -> E2,
    {
        Try {
            inner: self.inner.map_err(func),
        }
    }

    /// Recovers from a failure. Successes, empty or not, pass through.
    pub fn or_else<F>(self, func: F) -> Try<V, E>
    where
        F: FnOnce(E) -> Try<V, E>,
    {
        match self.inner {
            Err(e) => func(e),
            ok => Try { inner: ok },
        }
    }

    /// Invokes `consumer` with the value of a non-empty success.
    pub fn if_present<F>(&self, consumer: F)
    where
        F: FnOnce(&V),
    {
        if let Ok(Some(value)) = &self.inner {
            consumer(value);
        }
    }

    /// Invokes `consumer` with the value of a non-empty success, hands a
    /// failure back as `Err` and treats an empty success as `Ok`.
    pub fn if_present_or_else_fail<F>(self, consumer: F) -> Result<(), E>
    where
        F: FnOnce(V),
    {
        match self.inner {
            Ok(Some(value)) => {
                consumer(value);
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Invokes `consumer` with the error of a failure.
    pub fn on_failure<F>(self, consumer: F) -> Self
    where
        F: FnOnce(&E),
    {
        if let Err(e) = &self.inner {
            consumer(e);
        }
        self
    }

    pub fn get_or_else(self, default: V) -> V {
        match self.inner {
            Ok(Some(value)) => value,
            _ => default,
        }
    }

    pub fn as_error(&self) -> Option<&E> {
        self.inner.as_ref().err()
    }

    /// The underlying representation: failure, empty success or value.
    pub fn into_result(self) -> Result<Option<V>, E> {
        self.inner
    }

    /// Drops the error side; failures and empty successes become `None`.
    pub fn into_option(self) -> Option<V> {
        self.inner.ok().flatten()
    }
}

impl<V, E> Try<V, E>
where
    E: Into<Cause>,
{
    /// Returns the held value.
    ///
    /// A failure or an empty success is reported as
    /// [`TemplateError::EmptyResult`], with the failure's error as its cause.
    pub fn get(self) -> Result<V, TemplateError> {
        match self.inner {
            Ok(Some(value)) => Ok(value),
            Ok(None) => Err(TemplateError::EmptyResult { cause: None }),
            Err(e) => Err(TemplateError::EmptyResult {
                cause: Some(e.into()),
            }),
        }
    }
}

impl<V, E> From<Result<V, E>> for Try<V, E> {
    fn from(result: Result<V, E>) -> Self {
        Try {
            inner: result.map(Some),
        }
    }
}

impl<V: fmt::Debug, E: fmt::Debug> fmt::Debug for Try<V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            Ok(Some(value)) => f.debug_tuple("Success").field(value).finish(),
            Ok(None) => f.write_str("Empty"),
            Err(e) => f.debug_tuple("Failure").field(e).finish(),
        }
    }
}
