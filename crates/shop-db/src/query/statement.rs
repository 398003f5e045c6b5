//! A fully rendered statement: numbered SQL plus its ordered values.

use diesel::{
    query_builder::{BoxedSqlQuery, SqlQuery},
    sqlite::Sqlite,
};

use crate::query::{placeholder::number_placeholders, value::SqlValue};

/// SQL text with `?1..?N` placeholders and exactly N values.
///
/// Built fresh for every request by [`crate::query::SelectQuery`].
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    sql: String,
    values: Vec<SqlValue>,
}

impl Statement {
    /// Numbers the bare `?` markers of `raw` and pairs them with `values`.
    ///
    /// # Panics
    ///
    /// When the marker count differs from the number of values. That can
    /// only come from a mis-built fragment, never from caller input.
    pub fn render(raw: &str, values: Vec<SqlValue>) -> Self {
        let (sql, markers) = number_placeholders(raw);
        assert_eq!(
            markers,
            values.len(),
            "placeholder count does not match bound values in `{raw}`"
        );
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

    /// Converts into a diesel query with every value bound in order.
    pub(crate) fn into_query(self) -> BoxedSqlQuery<'static, Sqlite, SqlQuery> {
        let query = diesel::sql_query(self.sql).into_boxed::<Sqlite>();
        self.values
            .into_iter()
            .fold(query, |query, value| value.bind_to(query))
    }
}
