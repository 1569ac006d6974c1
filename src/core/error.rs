/// Error Module
///
/// This module defines the error type shared by every pipeline step. Driver
/// failures of any native type are folded into a single domain error that
/// keeps the original error as its source.
use std::error::Error as StdError;
use thiserror::Error;

/// Boxed native error retained as the cause of a domain error.
pub type Cause = Box<dyn StdError + Send + Sync + 'static>;

const DEFAULT_MESSAGE: &str = "SQL template error";

/// Error type for pipeline construction and execution.
///
/// The variants are kinds rather than concrete failures:
/// - driver failures (I/O, constraint violation, malformed SQL, type mismatch)
/// - protocol misuse (executing with no prepared statement)
/// - forced unwrap of an empty or failed result
/// - configuration and output errors of the command line runner
#[derive(Error, Debug)]
pub enum TemplateError {
    /// Failure raised by the underlying connection, statement or cursor
    #[error("{message}: {}", display_cause(.cause))]
    Driver {
        message: String,
        #[source]
        cause: Option<Cause>,
    },

    /// An execution verb was used before any statement was prepared
    #[error("statement not found")]
    StatementNotFound,

    /// A failed or empty result was unwrapped
    #[error("empty result")]
    EmptyResult {
        #[source]
        cause: Option<Cause>,
    },

    /// Pipeline configuration loading and validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system and I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON rendering errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn display_cause(cause: &Option<Cause>) -> String {
    match cause {
        Some(cause) => cause.to_string(),
        None => "no further details".to_string(),
    }
}

impl TemplateError {
    /// Wraps a native driver error, keeping it as the cause.
    pub fn driver<E>(message: impl Into<String>, cause: E) -> Self
    where
        E: Into<Cause>,
    {
        TemplateError::Driver {
            message: non_empty(message.into()),
            cause: Some(cause.into()),
        }
    }

    /// Creates a driver error that has no underlying cause.
    pub fn message_only(message: impl Into<String>) -> Self {
        TemplateError::Driver {
            message: non_empty(message.into()),
            cause: None,
        }
    }

    /// Human readable message of this error. Never empty.
    pub fn message(&self) -> String {
        match self {
            TemplateError::Driver { message, .. } => message.clone(),
            other => non_empty(other.to_string()),
        }
    }

    /// The retained underlying error, if this error was built from one.
    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        match self {
            TemplateError::Driver { cause, .. } | TemplateError::EmptyResult { cause } => {
                cause.as_deref()
            }
            _ => None,
        }
    }

    pub fn is_driver(&self) -> bool {
        matches!(self, TemplateError::Driver { .. })
    }

    pub fn is_statement_not_found(&self) -> bool {
        matches!(self, TemplateError::StatementNotFound)
    }

    pub fn is_empty_result(&self) -> bool {
        matches!(self, TemplateError::EmptyResult { .. })
    }
}

fn non_empty(message: String) -> String {
    if message.trim().is_empty() {
        DEFAULT_MESSAGE.to_string()
    } else {
        message
    }
}

impl From<rusqlite::Error> for TemplateError {
    fn from(e: rusqlite::Error) -> Self {
        TemplateError::driver(DEFAULT_MESSAGE, e)
    }
}

impl From<toml::de::Error> for TemplateError {
    fn from(e: toml::de::Error) -> Self {
        TemplateError::Config(e.to_string())
    }
}

/// Type alias for Result to use TemplateError as the error type.
pub type Result<T> = std::result::Result<T, TemplateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let driver_err = TemplateError::driver(
            "failed to prepare statement",
            rusqlite::Error::ExecuteReturnedResults,
        );
        assert!(driver_err.to_string().starts_with("failed to prepare statement: "));

        assert_eq!(TemplateError::StatementNotFound.to_string(), "statement not found");

        let config_err = TemplateError::Config("Invalid config".to_string());
        assert!(config_err.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_message_is_never_empty() {
        let err = TemplateError::driver("", rusqlite::Error::InvalidQuery);
        assert_eq!(err.message(), "SQL template error");

        let err = TemplateError::message_only("   ");
        assert_eq!(err.message(), "SQL template error");

        assert_eq!(TemplateError::StatementNotFound.message(), "statement not found");
    }

    #[test]
    fn test_cause_is_retained() {
        let err: TemplateError = rusqlite::Error::InvalidColumnIndex(3).into();
        assert!(err.is_driver());
        let cause = err.cause().expect("cause should be kept");
        assert!(cause.to_string().contains('3'));
        assert!(err.source().is_some());

        assert!(TemplateError::message_only("boom").cause().is_none());
        assert!(TemplateError::StatementNotFound.cause().is_none());
    }

    #[test]
    fn test_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: TemplateError = io_err.into();
        match err {
            TemplateError::Io(_) => {}
            _ => panic!("Expected IO error"),
        }

        let toml_err = toml::from_str::<toml::Value>("= nope").unwrap_err();
        let err: TemplateError = toml_err.into();
        match err {
            TemplateError::Config(_) => {}
            _ => panic!("Expected Config error"),
        }
    }
}
