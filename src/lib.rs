// Core infrastructure modules
pub mod core;

// Pipeline modules
pub mod config;
pub mod operation;
pub mod template;

#[cfg(test)]
mod test_utils;

pub use crate::core::db::connection::{SqliteConnection, TransactionState};
pub use crate::core::db::rows::RowSet;
pub use crate::core::db::session::{Session, SessionState};
pub use crate::core::db::statement::StatementHandle;
pub use crate::core::driver::{Connection, Cursor, Statement};
pub use crate::core::error::{Result, TemplateError};
pub use crate::core::try_result::Try;
pub use crate::core::value::{Row, Value};
pub use crate::operation::Operation;
pub use crate::template::{Template, TemplateBuilder};
