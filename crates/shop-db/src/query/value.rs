//! Values bound to statement placeholders.

use diesel::{
    query_builder::{BoxedSqlQuery, SqlQuery},
    sql_types::{BigInt, Double, Text},
    sqlite::Sqlite,
};

/// A single positional parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    Integer(i64),
    Real(f64),
}

impl SqlValue {
    /// Appends this value as the next bind of `query`.
    pub(crate) fn bind_to(
        self,
        query: BoxedSqlQuery<'static, Sqlite, SqlQuery>,
    ) -> BoxedSqlQuery<'static, Sqlite, SqlQuery> {
        match self {
            SqlValue::Text(v) => query.bind::<Text, _>(v),
            SqlValue::Integer(v) => query.bind::<BigInt, _>(v),
            SqlValue::Real(v) => query.bind::<Double, _>(v),
        }
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Integer(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        SqlValue::Integer(value as i64)
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Real(value)
    }
}
