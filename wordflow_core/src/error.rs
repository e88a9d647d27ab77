//! Error types shared across the WordFlow core

use thiserror::Error;

/// Errors raised by catalog loading, persistence and the study session
#[derive(Error, Debug)]
pub enum WordflowError {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// A persisted value exists but cannot be decoded
    #[error("Corrupt value under '{key}': {message}")]
    Corrupt { key: String, message: String },

    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error("Import failed: {0}")]
    Import(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Excel error: {0}")]
    Excel(String),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("Unsupported file format: .{0}")]
    UnsupportedFormat(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl WordflowError {
    pub(crate) fn corrupt(key: &str, message: impl ToString) -> Self {
        WordflowError::Corrupt {
            key: key.to_string(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, WordflowError>;
