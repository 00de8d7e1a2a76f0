//! Marquee Core Library
//!
//! This crate provides the data-access layer for Marquee, a small store of
//! movie records identified by their release year and title.
//!
//! # Architecture
//!
//! - **SQLite**: Backing store, one table named by configuration
//! - **Handlers**: Map a request (path parameters, body) to a status code and body
//!
//! Every operation opens its own connection and releases it before returning.
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let table = MovieTable::new(&config);
//!
//! table.insert(r#"{"year":1994,"title":"Pulp Fiction!","info":{"plot":"...","rating":8.9}}"#)?;
//!
//! match table.find_by_key("1994", &parse_slug("Pulp-Fiction"))? {
//!     Lookup::Found(movie) => println!("{}", movie.info.plot),
//!     Lookup::NotFound => println!("no such movie"),
//! }
//! ```
//!
//! # Modules
//!
//! - `models`: Movie record and key types
//! - `slug`: Slug parsing and title sanitizing
//! - `dal`: Data access layer (main entry point)
//! - `handlers`: Request handlers for the five entrypoints
//! - `storage`: SQLite binding, expressions and row translation
//! - `config`: Application configuration

pub mod config;
pub mod dal;
pub mod handlers;
pub mod models;
pub mod slug;
pub mod storage;

pub use config::Config;
pub use dal::{DalError, DalResult, Lookup, MovieTable};
pub use handlers::{Request, Response};
pub use models::{MovieInfo, MovieKey, MovieRecord};
pub use slug::{parse_slug, sanitize_title};
pub use storage::{StorageError, StorageResult};
