//! Data models for Marquee
//!
//! Defines the movie record, its nested info, and the composite key.
//! The serde shape of `MovieRecord` is the wire format:
//!
//! ```text
//! {"year": 1994, "title": "Pulp Fiction", "info": {"plot": "...", "rating": 8.9}}
//! ```

use serde::{Deserialize, Serialize};

use crate::slug::sanitize_title;

/// A movie, identified by `(year, title)`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieRecord {
    /// Release year (partition component of the key)
    pub year: i64,
    /// Title (sort component of the key)
    pub title: String,
    /// Descriptive attributes
    #[serde(default)]
    pub info: MovieInfo,
}

/// Non-key attributes of a movie
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MovieInfo {
    #[serde(default)]
    pub plot: String,
    #[serde(default)]
    pub rating: f64,
}

impl MovieRecord {
    /// Create a record with empty info
    pub fn new(year: i64, title: impl Into<String>) -> Self {
        Self {
            year,
            title: title.into(),
            info: MovieInfo::default(),
        }
    }

    /// Set the plot and rating
    pub fn with_info(mut self, plot: impl Into<String>, rating: f64) -> Self {
        self.info = MovieInfo {
            plot: plot.into(),
            rating,
        };
        self
    }

    /// Decode a record from a JSON request body
    pub fn from_json(body: &str) -> serde_json::Result<Self> {
        serde_json::from_str(body)
    }

    /// Encode the record in its wire representation
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Strip punctuation from the title so it can be rebuilt from a slug
    pub fn sanitize(&mut self) {
        self.title = sanitize_title(&self.title);
    }

    /// The composite key of this record
    pub fn key(&self) -> MovieKey {
        MovieKey::new(self.year, self.title.clone())
    }
}

/// Composite identity of a movie
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MovieKey {
    pub year: i64,
    pub title: String,
}

impl MovieKey {
    pub fn new(year: i64, title: impl Into<String>) -> Self {
        Self {
            year,
            title: title.into(),
        }
    }
}

impl std::fmt::Display for MovieKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.year, self.title)
    }
}
