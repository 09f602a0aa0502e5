//! # Error Types Module
//!
//! This module defines the error types returned when a whole data source cannot be
//! used. Row-level problems inside a table never surface here: they are logged and
//! skipped by the loaders.

/// Errors raised while loading reference tables or product records
#[derive(Debug, Clone, PartialEq)]
pub enum DataError {
    /// File could not be opened or read
    Io(String),
    /// CSV header or stream could not be read
    Csv(String),
    /// Product response was not valid JSON
    Json(String),
    /// Barcode identifier is not a GTIN
    InvalidGtin(String),
}

impl std::fmt::Display for DataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataError::Io(msg) => write!(f, "I/O error: {msg}"),
            DataError::Csv(msg) => write!(f, "CSV error: {msg}"),
            DataError::Json(msg) => write!(f, "JSON error: {msg}"),
            DataError::InvalidGtin(msg) => write!(f, "Invalid GTIN: {msg}"),
        }
    }
}

impl std::error::Error for DataError {}

impl From<std::io::Error> for DataError {
    fn from(err: std::io::Error) -> Self {
        DataError::Io(err.to_string())
    }
}

impl From<csv::Error> for DataError {
    fn from(err: csv::Error) -> Self {
        DataError::Csv(err.to_string())
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::Json(err.to_string())
    }
}
