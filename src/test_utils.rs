/// # Test Utilities Module
///
/// A recording fake driver for unit tests. Every capability call is logged
/// so tests can assert call counts and ordering, and failures can be
/// scripted per connection.
use crate::core::driver::{Connection, Cursor, Statement};
use crate::core::value::{Row, Value};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use thiserror::Error;

/// A driver call recorded by the fake.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    SetAutoCommit(bool),
    Commit,
    Rollback,
    Prepare(String),
    Bind(usize, Value),
    ExecuteForEffect,
    ExecuteForRows,
    ReleaseStatement,
    Advance,
    ReleaseCursor,
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("fake driver: {0}")]
pub struct FakeError(pub String);

#[derive(Debug, Clone, Default)]
struct Script {
    update_count: u64,
    rows: Vec<Row>,
    fail_prepare_containing: Option<String>,
    fail_bind_at: Option<usize>,
    fail_fetch_at: Option<usize>,
    fail_execute: bool,
    fail_commit: bool,
}

type Log = Rc<RefCell<Vec<Call>>>;

/// Fake connection with a shared call log.
#[derive(Debug, Clone)]
pub struct FakeConnection {
    log: Log,
    script: Rc<Script>,
}

impl FakeConnection {
    pub fn new() -> Self {
        FakeConnection {
            log: Rc::new(RefCell::new(Vec::new())),
            script: Rc::new(Script {
                update_count: 1,
                ..Script::default()
            }),
        }
    }

    fn scripted(self, edit: impl FnOnce(&mut Script)) -> Self {
        let mut script = (*self.script).clone();
        edit(&mut script);
        FakeConnection {
            log: self.log,
            script: Rc::new(script),
        }
    }

    pub fn with_update_count(self, count: u64) -> Self {
        self.scripted(|s| s.update_count = count)
    }

    /// Rows every query on this connection yields.
    pub fn with_rows(self, rows: Vec<Row>) -> Self {
        self.scripted(|s| s.rows = rows)
    }

    pub fn fail_prepare_containing(self, pattern: &str) -> Self {
        let pattern = pattern.to_string();
        self.scripted(|s| s.fail_prepare_containing = Some(pattern))
    }

    /// Binding the parameter at this 1-based index fails.
    pub fn fail_bind_at(self, index: usize) -> Self {
        self.scripted(|s| s.fail_bind_at = Some(index))
    }

    /// The n-th advance of every cursor (1-based) fails.
    pub fn fail_fetch_at(self, advance: usize) -> Self {
        self.scripted(|s| s.fail_fetch_at = Some(advance))
    }

    pub fn fail_execute(self) -> Self {
        self.scripted(|s| s.fail_execute = true)
    }

    pub fn fail_commit(self) -> Self {
        self.scripted(|s| s.fail_commit = true)
    }

    /// A cursor over the scripted rows, as a query would return.
    pub fn cursor(&self) -> FakeCursor {
        FakeCursor::new(self.log.clone(), &self.script)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.log.borrow().clone()
    }

    /// Calls logged after the most recent prepare.
    pub fn calls_after_prepare(&self) -> Vec<Call> {
        let calls = self.calls();
        let start = calls
            .iter()
            .rposition(|c| matches!(c, Call::Prepare(_)))
            .map(|i| i + 1)
            .unwrap_or(0);
        calls[start..].to_vec()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.log.borrow().iter().filter(|c| *c == call).count()
    }

    pub fn count_binds(&self) -> usize {
        self.log
            .borrow()
            .iter()
            .filter(|c| matches!(c, Call::Bind(..)))
            .count()
    }

    fn record(&self, call: Call) {
        self.log.borrow_mut().push(call);
    }
}

impl Connection for FakeConnection {
    type Error = FakeError;
    type Statement<'c> = FakeStatement where Self: 'c;

    fn set_auto_commit(&self, enabled: bool) -> Result<(), FakeError> {
        self.record(Call::SetAutoCommit(enabled));
        Ok(())
    }

    fn commit(&self) -> Result<(), FakeError> {
        self.record(Call::Commit);
        if self.script.fail_commit {
            return Err(FakeError("commit failed".into()));
        }
        Ok(())
    }

    fn rollback(&self) -> Result<(), FakeError> {
        self.record(Call::Rollback);
        Ok(())
    }

    fn prepare_statement<'c>(&'c self, sql: &str) -> Result<FakeStatement, FakeError> {
        self.record(Call::Prepare(sql.to_string()));
        if let Some(pattern) = &self.script.fail_prepare_containing {
            if sql.contains(pattern.as_str()) {
                return Err(FakeError(format!("syntax error near {}", pattern)));
            }
        }
        Ok(FakeStatement {
            placeholders: sql.matches('?').count(),
            log: self.log.clone(),
            script: Rc::clone(&self.script),
        })
    }
}

pub struct FakeStatement {
    placeholders: usize,
    log: Log,
    script: Rc<Script>,
}

impl Statement for FakeStatement {
    type Error = FakeError;
    type Cursor = FakeCursor;

    fn bind_parameter(&mut self, index: usize, value: &Value) -> Result<(), FakeError> {
        self.log.borrow_mut().push(Call::Bind(index, value.clone()));
        if index > self.placeholders {
            return Err(FakeError(format!("no placeholder at {}", index)));
        }
        if self.script.fail_bind_at == Some(index) {
            return Err(FakeError(format!("incompatible parameter at {}", index)));
        }
        Ok(())
    }

    fn execute_for_effect(&mut self) -> Result<u64, FakeError> {
        self.log.borrow_mut().push(Call::ExecuteForEffect);
        if self.script.fail_execute {
            return Err(FakeError("execution failed".into()));
        }
        Ok(self.script.update_count)
    }

    fn execute_for_rows(&mut self) -> Result<FakeCursor, FakeError> {
        self.log.borrow_mut().push(Call::ExecuteForRows);
        if self.script.fail_execute {
            return Err(FakeError("execution failed".into()));
        }
        Ok(FakeCursor::new(self.log.clone(), &self.script))
    }

    fn release(&mut self) {
        self.log.borrow_mut().push(Call::ReleaseStatement);
    }
}

pub struct FakeCursor {
    rows: VecDeque<Row>,
    current: Option<Row>,
    column_count: usize,
    advances: usize,
    fail_fetch_at: Option<usize>,
    log: Log,
}

impl FakeCursor {
    fn new(log: Log, script: &Script) -> Self {
        FakeCursor {
            rows: script.rows.iter().cloned().collect(),
            current: None,
            column_count: script.rows.first().map(Vec::len).unwrap_or(0),
            advances: 0,
            fail_fetch_at: script.fail_fetch_at,
            log,
        }
    }
}

impl Cursor for FakeCursor {
    type Error = FakeError;

    fn advance(&mut self) -> Result<bool, FakeError> {
        self.log.borrow_mut().push(Call::Advance);
        self.advances += 1;
        if self.fail_fetch_at == Some(self.advances) {
            return Err(FakeError("fetch failed".into()));
        }
        self.current = self.rows.pop_front();
        Ok(self.current.is_some())
    }

    fn column_count(&self) -> usize {
        self.column_count
    }

    fn column_value(&self, index: usize) -> Result<Value, FakeError> {
        self.current
            .as_ref()
            .and_then(|row| row.get(index))
            .cloned()
            .ok_or_else(|| FakeError(format!("no column {}", index)))
    }

    fn release(&mut self) {
        self.log.borrow_mut().push(Call::ReleaseCursor);
    }
}
