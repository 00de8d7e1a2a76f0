//! Storage layer
//!
//! Binds the movie table to SQLite.
//!
//! ## Architecture
//!
//! - **schema**: Table names and table provisioning
//! - **expression**: Filter, projection and update expressions rendered to SQL
//! - **item**: Translation between SQLite rows and `MovieRecord`
//!
//! Items are stored as one row per movie: the key attributes `year` and
//! `title` are columns, and `info` is a JSON document so that nested paths
//! such as `info.rating` can be read and set in place.

pub mod error;
pub mod expression;
pub mod item;
pub mod schema;

pub use error::{StorageError, StorageResult};
pub use expression::{AttributePath, Condition, Expression, ExpressionBuilder, Projection, Update};
pub use schema::{create_table, TableName};
