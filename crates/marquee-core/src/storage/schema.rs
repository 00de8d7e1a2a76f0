//! Table names and provisioning
//!
//! The movie table is created once, out of band, by `create_table`. The data
//! access layer never creates or alters tables on its own; querying a table
//! that was never created is a storage error.

use rusqlite::Connection;

use crate::storage::error::{StorageError, StorageResult};

/// A validated table name
///
/// Follows the usual key-value store naming rules: 3 to 255 characters drawn
/// from ASCII letters, digits, `_`, `-` and `.`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableName(String);

impl TableName {
    /// Validate a configured table name
    pub fn parse(name: &str) -> StorageResult<Self> {
        let invalid = |reason| StorageError::InvalidTableName {
            name: name.to_string(),
            reason,
        };

        if name.len() < 3 || name.len() > 255 {
            return Err(invalid("must be between 3 and 255 characters"));
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        {
            return Err(invalid("only letters, digits, '_', '-' and '.' are allowed"));
        }

        Ok(Self(name.to_string()))
    }

    /// Resolve an optional configured name
    pub fn from_config(name: Option<&str>) -> StorageResult<Self> {
        match name {
            Some(name) => Self::parse(name),
            None => Err(StorageError::MissingTableName),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The name quoted as an SQL identifier
    pub fn quoted(&self) -> String {
        // Validation rules out '"', so no escaping is needed
        format!("\"{}\"", self.0)
    }
}

impl std::fmt::Display for TableName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Create the movie table if it does not exist
pub fn create_table(conn: &Connection, table: &TableName) -> rusqlite::Result<()> {
    conn.execute_batch(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table} (
            year INTEGER NOT NULL,
            title TEXT NOT NULL,
            info TEXT NOT NULL DEFAULT '{{}}',
            PRIMARY KEY (year, title)
        );
        "#,
        table = table.quoted()
    ))
}
