//! Row translation
//!
//! Converts between `MovieRecord` and the stored row layout:
//!
//! | column  | type    | content                          |
//! |---------|---------|----------------------------------|
//! | `year`  | INTEGER | key                              |
//! | `title` | TEXT    | key                              |
//! | `info`  | TEXT    | JSON document `{plot, rating}`   |
//!
//! Attributes left out of a projection come back as their zero value.
//! Only whole columns are read; nested `info` paths are never projected.

use rusqlite::Row;

use crate::models::{MovieInfo, MovieRecord};
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::expression::AttributePath;

/// Attribute names used in the table and in expressions
pub mod attrs {
    pub const YEAR: &str = "year";
    pub const TITLE: &str = "title";
    pub const INFO: &str = "info";

    // Fields of the info document
    pub const PLOT: &str = "plot";
    pub const RATING: &str = "rating";
}

/// Raw values read from one row
#[derive(Debug, Default)]
pub struct ItemRow {
    year: Option<i64>,
    title: Option<String>,
    info: Option<String>,
}

impl ItemRow {
    /// Read a row whose columns follow `projected`
    pub fn from_row(row: &Row<'_>, projected: &[AttributePath]) -> rusqlite::Result<Self> {
        let mut item = ItemRow::default();
        for (idx, path) in projected.iter().enumerate() {
            match *path {
                AttributePath::Column(attrs::YEAR) => item.year = row.get(idx)?,
                AttributePath::Column(attrs::TITLE) => item.title = row.get(idx)?,
                AttributePath::Column(attrs::INFO) => item.info = row.get(idx)?,
                _ => {}
            }
        }
        Ok(item)
    }

    /// Build the record, decoding the info document if it was read
    pub fn into_record(self) -> StorageResult<MovieRecord> {
        let year = self.year.unwrap_or_default();
        let title = self.title.unwrap_or_default();

        let info = match self.info {
            Some(document) => decode_info(&document).map_err(|e| StorageError::CorruptItem {
                key: format!("{}/{}", year, title),
                details: e.to_string(),
            })?,
            None => MovieInfo::default(),
        };

        Ok(MovieRecord { year, title, info })
    }
}

/// Encode the info document for the `info` column
pub fn encode_info(info: &MovieInfo) -> StorageResult<String> {
    Ok(serde_json::to_string(info)?)
}

fn decode_info(document: &str) -> serde_json::Result<MovieInfo> {
    serde_json::from_str(document)
}
