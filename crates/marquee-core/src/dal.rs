//! Data access layer
//!
//! `MovieTable` is the single entry point to stored movies. It owns every
//! translation between request input (year strings, slugs, JSON bodies), the
//! typed `MovieRecord`, and the SQL the table understands.
//!
//! ## Connections
//!
//! Each operation opens its own connection and drops it before returning,
//! on success and on failure alike. Nothing is cached between calls.
//!
//! ## Absence
//!
//! A clean miss is not an error. Point reads and updates return
//! `Lookup::NotFound`; only infrastructure failures, bad input and malformed
//! bodies are `DalError`s.
//!
//! ## Concurrency
//!
//! Every operation is a single SQL statement. There is no locking beyond
//! that: two updates racing on the same key end with whichever ran last.

use std::path::Path;
use std::time::Duration;

use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::Config;
use crate::models::{MovieKey, MovieRecord};
use crate::storage::expression::{
    AttributePath, Condition, Expression, ExpressionBuilder, Projection, Update,
};
use crate::storage::item::{attrs, encode_info, ItemRow};
use crate::storage::schema::{create_table, TableName};
use crate::storage::{StorageError, StorageResult};

/// How long a connection waits on a locked database before failing
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors surfaced by data access operations
#[derive(Error, Debug)]
pub enum DalError {
    /// Request input has the wrong shape
    #[error("Invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// Request body is not a movie record
    #[error("Malformed request body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The backing store failed
    #[error(transparent)]
    Store(#[from] StorageError),
}

impl DalError {
    fn validation(field: &'static str, message: impl Into<String>) -> Self {
        DalError::Validation {
            field,
            message: message.into(),
        }
    }
}

/// Result type for data access operations
pub type DalResult<T> = Result<T, DalError>;

/// Outcome of an operation addressed to a single key
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
}

impl<T> Lookup<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    /// Convert into an `Option`
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::NotFound => None,
        }
    }
}

/// Data access for the configured movie table
pub struct MovieTable {
    config: Config,
}

impl MovieTable {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Create the table if it does not exist yet
    pub fn provision(&self) -> DalResult<()> {
        let (conn, table) = self.connect()?;
        create_table(&conn, &table).map_err(|e| StorageError::from_sqlite(e, table.as_str()))?;
        info!(table = %table, "Table provisioned");
        Ok(())
    }

    /// Point lookup by exact composite key
    ///
    /// `title` is used as given; callers turn slugs into titles first.
    pub fn find_by_key(&self, year: &str, title: &str) -> DalResult<Lookup<MovieRecord>> {
        let key = MovieKey::new(parse_year(year)?, title);
        let (conn, table) = self.connect()?;
        debug!(table = %table, key = %key, "Reading item");

        let expr = ExpressionBuilder::new()
            .with_filter(Condition::key(&key))
            .with_projection(Projection::all())
            .build()?;

        let row = conn
            .query_row(&select_sql(&table, &expr), params_from_iter(expr.values()), |row| {
                ItemRow::from_row(row, expr.projected())
            })
            .optional()
            .map_err(|e| StorageError::from_sqlite(e, table.as_str()))?;

        match row {
            Some(row) => Ok(Lookup::Found(row.into_record()?)),
            None => {
                debug!(key = %key, "No item found");
                Ok(Lookup::NotFound)
            }
        }
    }

    /// All movies of a year, with only `title` and `year` populated
    pub fn scan_by_year(&self, year: &str) -> DalResult<Vec<MovieRecord>> {
        let year_value = parse_year(year)?;
        let (conn, table) = self.connect()?;

        let expr = ExpressionBuilder::new()
            .with_filter(Condition::equal(AttributePath::Column(attrs::YEAR), year_value))
            .with_projection(Projection::names([
                AttributePath::Column(attrs::TITLE),
                AttributePath::Column(attrs::YEAR),
            ]))
            .build()?;

        let rows = query_rows(&conn, &table, &expr)
            .map_err(|e| StorageError::from_sqlite(e, table.as_str()))?;
        let movies = rows
            .into_iter()
            .map(ItemRow::into_record)
            .collect::<StorageResult<Vec<_>>>()?;

        debug!(table = %table, year = year_value, count = movies.len(), "Scanned year");
        Ok(movies)
    }

    /// Decode a record, sanitize its title and write it, replacing any
    /// record with the same key
    pub fn insert(&self, body: &str) -> DalResult<MovieRecord> {
        let movie = decode_body(body)?;
        let (conn, table) = self.connect()?;

        conn.execute(
            &format!(
                "INSERT OR REPLACE INTO {} ({}, {}, {}) VALUES (?1, ?2, ?3)",
                table.quoted(),
                attrs::YEAR,
                attrs::TITLE,
                attrs::INFO
            ),
            params![movie.year, movie.title, encode_info(&movie.info)?],
        )
        .map_err(|e| StorageError::from_sqlite(e, table.as_str()))?;

        info!(table = %table, key = %movie.key(), "Wrote item");
        Ok(movie)
    }

    /// Decode a record, sanitize its title and overwrite `info.rating` and
    /// `info.plot` of the stored record with that key
    ///
    /// The rating is rounded to one decimal place. A missing record is left
    /// missing and reported as `Lookup::NotFound`.
    pub fn update(&self, body: &str) -> DalResult<Lookup<MovieRecord>> {
        let mut movie = decode_body(body)?;
        movie.info.rating = round_rating(movie.info.rating);
        let (conn, table) = self.connect()?;

        let expr = ExpressionBuilder::new()
            .with_update(
                Update::new()
                    .set(AttributePath::Info(attrs::RATING), movie.info.rating)
                    .set(AttributePath::Info(attrs::PLOT), movie.info.plot.clone()),
            )
            .with_filter(Condition::key(&movie.key()))
            .build()?;

        let changed = conn
            .execute(&update_sql(&table, &expr), params_from_iter(expr.values()))
            .map_err(|e| StorageError::from_sqlite(e, table.as_str()))?;

        if changed == 0 {
            debug!(table = %table, key = %movie.key(), "No item to update");
            return Ok(Lookup::NotFound);
        }

        info!(table = %table, key = %movie.key(), "Updated item");
        Ok(Lookup::Found(movie))
    }

    /// Delete by composite key; deleting a missing record succeeds
    pub fn delete(&self, year: &str, title: &str) -> DalResult<()> {
        let key = MovieKey::new(parse_year(year)?, title);
        let (conn, table) = self.connect()?;

        let expr = ExpressionBuilder::new()
            .with_filter(Condition::key(&key))
            .build()?;
        let filter = expr.filter().unwrap_or("0");

        let removed = conn
            .execute(
                &format!("DELETE FROM {} WHERE {}", table.quoted(), filter),
                params_from_iter(expr.values()),
            )
            .map_err(|e| StorageError::from_sqlite(e, table.as_str()))?;

        info!(table = %table, key = %key, removed, "Deleted item");
        Ok(())
    }

    /// Open a connection for one operation
    ///
    /// The table name is checked before anything touches the filesystem.
    fn connect(&self) -> StorageResult<(Connection, TableName)> {
        let table = TableName::from_config(self.config.table_name.as_deref())?;
        let path = self.config.sqlite_path();

        ensure_parent_dir(&path)?;
        let conn = Connection::open(&path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        Ok((conn, table))
    }
}

fn parse_year(year: &str) -> DalResult<i64> {
    year.parse()
        .map_err(|_| DalError::validation("year", format!("'{}' is not a number", year)))
}

/// Decode a request body into a record with a sanitized title
fn decode_body(body: &str) -> DalResult<MovieRecord> {
    let mut movie = MovieRecord::from_json(body)?;
    movie.sanitize();

    if movie.title.is_empty() {
        return Err(DalError::validation(
            "title",
            "nothing left after removing punctuation",
        ));
    }

    debug!(key = %movie.key(), "Decoded request body");
    Ok(movie)
}

/// Round to one decimal place, the precision ratings are stored with on update
fn round_rating(rating: f64) -> f64 {
    format!("{:.1}", rating).parse().unwrap_or(rating)
}

fn select_sql(table: &TableName, expr: &Expression) -> String {
    let mut sql = format!(
        "SELECT {} FROM {}",
        expr.projection().unwrap_or("*"),
        table.quoted()
    );
    if let Some(filter) = expr.filter() {
        sql.push_str(" WHERE ");
        sql.push_str(filter);
    }
    sql
}

fn update_sql(table: &TableName, expr: &Expression) -> String {
    format!(
        "UPDATE {} SET {} WHERE {}",
        table.quoted(),
        expr.update().unwrap_or_default(),
        expr.filter().unwrap_or("0")
    )
}

fn query_rows(
    conn: &Connection,
    table: &TableName,
    expr: &Expression,
) -> rusqlite::Result<Vec<ItemRow>> {
    let mut stmt = conn.prepare(&select_sql(table, expr))?;
    let rows = stmt
        .query_map(params_from_iter(expr.values()), |row| {
            ItemRow::from_row(row, expr.projected())
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

fn ensure_parent_dir(path: &Path) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| StorageError::CreateDirectory {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}
