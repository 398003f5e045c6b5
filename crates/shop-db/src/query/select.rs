//! The list/lookup statement builder.

use diesel::{
    prelude::*,
    sql_types::{BigInt, Text},
    sqlite::SqliteConnection,
};
use tracing::debug;

use crate::query::{
    filter::FilterRequest,
    fragment::PredicateFragment,
    sort::{OrderClause, PageWindow},
    source::QuerySource,
    statement::Statement,
};

/// One row of a document query.
#[derive(Debug, QueryableByName)]
struct DocumentRow {
    #[diesel(sql_type = Text)]
    doc: String,
}

#[derive(Debug, QueryableByName)]
struct CountRow {
    #[diesel(sql_type = BigInt)]
    count: i64,
}

/// Builds the row statement and the matching count statement for one source.
///
/// Every row of the row statement is one serialized nested document. Both
/// statements share the same predicate fragments; only the row statement
/// carries ORDER BY and the page window.
///
/// # Example
///
/// ```ignore
/// let query = SelectQuery::from(&PRODUCTS)
///     .filter(PredicateFragment::new(products::ID.eq("P1")))
///     .window(PageWindow::single());
/// let docs = query.fetch_documents(conn)?;
/// ```
#[derive(Debug, Clone)]
pub struct SelectQuery {
    source: &'static QuerySource,
    wheres: Vec<PredicateFragment>,
    order: Option<OrderClause>,
    window: Option<PageWindow>,
}

impl SelectQuery {
    /// Starts a new query on the given source.
    pub fn from(source: &'static QuerySource) -> Self {
        Self {
            source,
            wheres: vec![],
            order: None,
            window: None,
        }
    }

    /// Composes filter predicates, resolved sort and page window of a request.
    pub fn for_request<F: FilterRequest>(source: &'static QuerySource, request: &F) -> Self {
        let mut query = Self::from(source)
            .filters(request.predicates())
            .order_by(source.sort.resolve(request.sort()));
        if let Some(paginate) = request.paginate() {
            query = query.window(paginate.into());
        }
        query
    }

    /// Applies a WHERE condition.
    pub fn filter(mut self, fragment: PredicateFragment) -> Self {
        self.wheres.push(fragment);
        self
    }

    pub fn filters(mut self, fragments: impl IntoIterator<Item = PredicateFragment>) -> Self {
        self.wheres.extend(fragments);
        self
    }

    pub fn order_by(mut self, clause: OrderClause) -> Self {
        self.order = Some(clause);
        self
    }

    pub fn window(mut self, window: PageWindow) -> Self {
        self.window = Some(window);
        self
    }

    pub fn source(&self) -> &'static QuerySource {
        self.source
    }

    fn push_wheres(&self, sql: &mut String, params: &mut Vec<crate::query::SqlValue>) {
        sql.push_str(" WHERE 1 = 1");
        for fragment in &self.wheres {
            sql.push_str(" AND ");
            sql.push_str(fragment.sql());
            params.extend_from_slice(fragment.values());
        }
    }

    /// Renders the document-producing statement.
    pub fn build_sql(&self) -> Statement {
        let mut params = vec![];
        let mut sql = format!(
            "SELECT {} AS doc FROM {}",
            self.source.document, self.source.from
        );

        self.push_wheres(&mut sql, &mut params);

        if let Some(order) = &self.order {
            sql.push(' ');
            sql.push_str(&order.to_sql(&mut params));
        }

        if let Some(window) = &self.window {
            sql.push(' ');
            sql.push_str(&window.to_sql(&mut params));
        }

        Statement::render(&sql, params)
    }

    /// Renders `COUNT(*)` over the filtered base table.
    pub fn build_count_sql(&self) -> Statement {
        let mut params = vec![];
        let mut sql = format!("SELECT COUNT(*) AS count FROM {}", self.source.from);

        self.push_wheres(&mut sql, &mut params);

        Statement::render(&sql, params)
    }

    /// Executes the row statement and returns the raw documents in order.
    pub fn fetch_documents(&self, conn: &mut SqliteConnection) -> QueryResult<Vec<String>> {
        let stmt = self.build_sql();
        debug!(sql = stmt.sql(), params = stmt.values().len(), "fetching documents");
        let rows = stmt.into_query().load::<DocumentRow>(conn)?;
        Ok(rows.into_iter().map(|row| row.doc).collect())
    }

    /// Executes the row statement limited to one row.
    pub fn fetch_one_document(self, conn: &mut SqliteConnection) -> QueryResult<Option<String>> {
        let mut docs = self.window(PageWindow::single()).fetch_documents(conn)?;
        Ok(docs.pop())
    }

    /// Executes the count statement.
    pub fn count(&self, conn: &mut SqliteConnection) -> QueryResult<i64> {
        let stmt = self.build_count_sql();
        debug!(sql = stmt.sql(), params = stmt.values().len(), "counting rows");
        let row = stmt.into_query().get_result::<CountRow>(conn)?;
        Ok(row.count)
    }
}
