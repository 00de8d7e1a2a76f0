//! Storage error handling
//!
//! Provides typed errors for storage operations with descriptive messages
//! and recovery suggestions.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    /// No table name configured
    #[error("No table name configured. Set table_name in config.toml or MARQUEE_TABLE_NAME.")]
    MissingTableName,

    /// Table name fails validation
    #[error("Invalid table name '{name}': {reason}")]
    InvalidTableName { name: String, reason: &'static str },

    /// Configured table has not been created
    #[error("Table '{table}' does not exist")]
    TableNotFound { table: String },

    /// Failed to create data directory
    #[error("Failed to create data directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// An expression refers to an attribute the table does not have
    #[error("Invalid expression: {0}")]
    InvalidExpression(String),

    /// Stored item could not be decoded
    #[error("Item '{key}' is corrupted: {details}")]
    CorruptItem { key: String, details: String },

    /// Item could not be encoded for storage
    #[error("Failed to encode item: {0}")]
    Encode(#[from] serde_json::Error),

    /// SQLite database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl StorageError {
    /// Create an error from a SQLite error with table context
    ///
    /// A query against a table that was never provisioned is reported as
    /// `TableNotFound` rather than a raw database error.
    pub fn from_sqlite(error: rusqlite::Error, table: &str) -> Self {
        match &error {
            rusqlite::Error::SqliteFailure(_, Some(msg)) if msg.starts_with("no such table") => {
                StorageError::TableNotFound {
                    table: table.to_string(),
                }
            }
            _ => StorageError::Database(error),
        }
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            StorageError::MissingTableName => {
                Some(
                    "Set table_name in ~/.config/marquee/config.toml or export MARQUEE_TABLE_NAME.",
                )
            }
            StorageError::InvalidTableName { .. } => {
                Some("Table names are 3-255 characters of letters, digits, '_', '-' and '.'.")
            }
            StorageError::TableNotFound { .. } => {
                Some("Create the table with `marquee provision`.")
            }
            StorageError::CreateDirectory { .. } => {
                Some("Check that the parent directory exists and you have write permissions.")
            }
            _ => None,
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
