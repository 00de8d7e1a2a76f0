//! Filter, projection and update expressions
//!
//! Expressions are built from attribute paths (`year`, `title`, `info`,
//! `info.plot`, `info.rating`) and rendered to SQL fragments with numbered
//! parameters. Nested `info` paths become `json_extract` / `json_set` calls
//! on the `info` document column.
//!
//! ```text
//! let expr = ExpressionBuilder::new()
//!     .with_filter(Condition::equal(AttributePath::Column(attrs::YEAR), 1994))
//!     .with_projection(Projection::names([
//!         AttributePath::Column(attrs::TITLE),
//!         AttributePath::Column(attrs::YEAR),
//!     ]))
//!     .build()?;
//!
//! expr.filter()      // Some("\"year\" = ?1")
//! expr.projection()  // Some("\"title\", \"year\"")
//! ```

use rusqlite::types::Value;

use crate::models::MovieKey;
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::item::attrs;

/// A reference to a stored attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributePath {
    /// A top-level attribute stored as its own column
    Column(&'static str),
    /// A field inside the `info` document
    Info(&'static str),
}

impl AttributePath {
    /// Dotted name of the path
    pub fn name(&self) -> String {
        match self {
            AttributePath::Column(column) => column.to_string(),
            AttributePath::Info(field) => format!("{}.{}", attrs::INFO, field),
        }
    }

    /// SQL expression reading this attribute
    fn select_sql(&self) -> String {
        match self {
            AttributePath::Column(column) => format!("\"{}\"", column),
            AttributePath::Info(field) => {
                format!("json_extract(\"{}\", '$.{}')", attrs::INFO, field)
            }
        }
    }
}

/// A filter condition
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Equal(AttributePath, Value),
    And(Vec<Condition>),
}

impl Condition {
    pub fn equal(path: AttributePath, value: impl Into<Value>) -> Self {
        Condition::Equal(path, value.into())
    }

    /// Combine two conditions
    pub fn and(self, other: Condition) -> Self {
        match self {
            Condition::And(mut conditions) => {
                conditions.push(other);
                Condition::And(conditions)
            }
            first => Condition::And(vec![first, other]),
        }
    }

    /// Exact match on the composite key
    pub fn key(key: &MovieKey) -> Self {
        let year = Condition::equal(AttributePath::Column(attrs::YEAR), key.year);
        let title = Condition::equal(AttributePath::Column(attrs::TITLE), key.title.clone());
        year.and(title)
    }

    fn render(&self, values: &mut Vec<Value>) -> StorageResult<String> {
        match self {
            Condition::Equal(path, value) => {
                values.push(value.clone());
                Ok(format!("{} = ?{}", path.select_sql(), values.len()))
            }
            Condition::And(conditions) => {
                if conditions.is_empty() {
                    return Err(StorageError::InvalidExpression(
                        "empty AND condition".to_string(),
                    ));
                }
                let parts = conditions
                    .iter()
                    .map(|c| c.render(values))
                    .collect::<StorageResult<Vec<_>>>()?;
                Ok(format!("({})", parts.join(" AND ")))
            }
        }
    }
}

/// The attributes a read returns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection(Vec<AttributePath>);

impl Projection {
    pub fn names(paths: impl IntoIterator<Item = AttributePath>) -> Self {
        Self(paths.into_iter().collect())
    }

    /// Every stored attribute
    pub fn all() -> Self {
        Self(vec![
            AttributePath::Column(attrs::YEAR),
            AttributePath::Column(attrs::TITLE),
            AttributePath::Column(attrs::INFO),
        ])
    }

    pub fn paths(&self) -> &[AttributePath] {
        &self.0
    }

    fn render(&self) -> StorageResult<String> {
        if self.0.is_empty() {
            return Err(StorageError::InvalidExpression(
                "projection names no attributes".to_string(),
            ));
        }
        Ok(self
            .0
            .iter()
            .map(AttributePath::select_sql)
            .collect::<Vec<_>>()
            .join(", "))
    }
}

/// Assignments to `info` fields
///
/// Key attributes can never be assigned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Update {
    sets: Vec<(AttributePath, Value)>,
}

impl Update {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, path: AttributePath, value: impl Into<Value>) -> Self {
        self.sets.push((path, value.into()));
        self
    }

    fn render(&self, values: &mut Vec<Value>) -> StorageResult<String> {
        if self.sets.is_empty() {
            return Err(StorageError::InvalidExpression(
                "update sets no attributes".to_string(),
            ));
        }

        let mut args = Vec::with_capacity(self.sets.len());
        for (path, value) in &self.sets {
            match path {
                AttributePath::Info(field) => {
                    values.push(value.clone());
                    args.push(format!("'$.{}', ?{}", field, values.len()));
                }
                AttributePath::Column(_) => {
                    return Err(StorageError::InvalidExpression(format!(
                        "cannot set '{}', only info fields are updatable",
                        path.name()
                    )));
                }
            }
        }

        Ok(format!(
            "\"{info}\" = json_set(\"{info}\", {})",
            args.join(", "),
            info = attrs::INFO
        ))
    }
}

/// Builds an `Expression` from its parts
#[derive(Debug, Clone, Default)]
pub struct ExpressionBuilder {
    filter: Option<Condition>,
    projection: Option<Projection>,
    update: Option<Update>,
}

impl ExpressionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(mut self, condition: Condition) -> Self {
        self.filter = Some(condition);
        self
    }

    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = Some(projection);
        self
    }

    pub fn with_update(mut self, update: Update) -> Self {
        self.update = Some(update);
        self
    }

    /// Render all parts, numbering parameters in a single sequence
    pub fn build(self) -> StorageResult<Expression> {
        if self.filter.is_none() && self.projection.is_none() && self.update.is_none() {
            return Err(StorageError::InvalidExpression(
                "expression is empty".to_string(),
            ));
        }

        let mut values = Vec::new();
        let update = self
            .update
            .as_ref()
            .map(|u| u.render(&mut values))
            .transpose()?;
        let filter = self
            .filter
            .as_ref()
            .map(|c| c.render(&mut values))
            .transpose()?;
        let projection = self.projection.as_ref().map(Projection::render).transpose()?;

        Ok(Expression {
            filter,
            projection,
            update,
            projected: self.projection.map(|p| p.0).unwrap_or_default(),
            values,
        })
    }
}

/// Rendered SQL fragments and their parameter values
#[derive(Debug, Clone)]
pub struct Expression {
    filter: Option<String>,
    projection: Option<String>,
    update: Option<String>,
    projected: Vec<AttributePath>,
    values: Vec<Value>,
}

impl Expression {
    /// `WHERE` clause body
    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    /// `SELECT` column list
    pub fn projection(&self) -> Option<&str> {
        self.projection.as_deref()
    }

    /// `UPDATE .. SET` clause body
    pub fn update(&self) -> Option<&str> {
        self.update.as_deref()
    }

    /// Projected attributes, in column order
    pub fn projected(&self) -> &[AttributePath] {
        &self.projected
    }

    /// Parameter values, `?1` first
    pub fn values(&self) -> &[Value] {
        &self.values
    }
}
