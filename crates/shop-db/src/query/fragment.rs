//! Predicate fragments: a boolean SQL condition and the values it binds.

use crate::{
    query::{placeholder::count_markers, value::SqlValue},
    traits::Expression,
};

/// One `AND`-able condition of a WHERE clause.
///
/// The SQL uses bare `?` markers; `values` holds exactly one entry per
/// marker, in the order the markers appear.
#[derive(Debug, Clone, PartialEq)]
pub struct PredicateFragment {
    sql: String,
    values: Vec<SqlValue>,
}

impl PredicateFragment {
    /// Renders an expression into a fragment.
    pub fn new<E: Expression>(expr: E) -> Self {
        let mut values = Vec::new();
        let sql = expr.to_sql(&mut values);
        debug_assert_eq!(count_markers(&sql), values.len(), "fragment `{sql}`");
        Self {
            sql,
            values,
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }
}
