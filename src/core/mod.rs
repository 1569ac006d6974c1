/// Core Module
///
/// This module contains the fundamental components a pipeline is built on:
/// the error type, the `Try` result container, dynamically typed values, the
/// driver capability traits and the session layer.

pub mod db;
pub mod driver;
pub mod error;
pub mod try_result;
pub mod value;

// Re-export commonly used types for convenience
pub use error::{Result, TemplateError};
pub use try_result::Try;
pub use value::{Row, Value};
