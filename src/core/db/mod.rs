/// Database Module
///
/// The stateful layer a pipeline runs on, plus the bundled SQLite driver.
///
/// ## Architecture
///
/// - **Statement Handle** (`statement.rs`): owns one prepared statement, binds and executes it
/// - **Result Set Adapter** (`rows.rs`): uniform single-pass rows over a cursor or an update count
/// - **Session** (`session.rs`): the {connection, statement, result} snapshot each step produces
/// - **SQLite Driver** (`connection.rs`, `query.rs`): rusqlite implementation of the driver traits
pub mod connection;
pub mod query;
pub mod rows;
pub mod session;
pub mod statement;

pub use connection::*;
pub use query::*;
pub use rows::*;
pub use session::*;
pub use statement::*;
