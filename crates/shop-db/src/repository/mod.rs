//! Repositories: the read and write entry points for each entity.
//!
//! Every function borrows one connection for the duration of the call and
//! takes the caller's [`Deadline`]. List reads never fail: store or decode
//! errors are logged and produce an empty page. Single reads and writes
//! propagate their errors.

pub mod category;
pub mod order;
pub mod product;
pub mod user;

use diesel::sqlite::SqliteConnection;
use serde::de::DeserializeOwned;
use tracing::warn;

pub use category::CategoryRepository;
pub use order::OrderRepository;
pub use product::ProductRepository;
pub use user::UserRepository;

use crate::{
    deadline::Deadline,
    error::{DbError, Result},
    materialize::{materialize, materialize_one},
    models::types::Page,
    query::{FilterRequest, PredicateFragment, QuerySource, SelectQuery},
};

/// Reads every document matched by `query`.
fn load_all<T: DeserializeOwned>(
    conn: &mut SqliteConnection,
    query: &SelectQuery,
    deadline: Deadline,
) -> Result<Vec<T>> {
    let entity = query.source().entity;
    deadline.check(entity)?;
    let docs = query.fetch_documents(conn)?;
    materialize(entity, &docs)
}

/// One page of `source` for `filter`, plus the total number of matches.
fn find_page<T, F>(
    conn: &mut SqliteConnection,
    source: &'static QuerySource,
    filter: &F,
    deadline: Deadline,
) -> Page<T>
where
    T: DeserializeOwned,
    F: FilterRequest,
{
    let paginate = filter.paginate().unwrap_or_default();
    let query = SelectQuery::for_request(source, filter);

    let data = match load_all(conn, &query, deadline) {
        Ok(data) => data,
        Err(err) => {
            warn!(entity = source.entity, error = %err, "list read failed, returning an empty page");
            return Page::empty(paginate);
        }
    };

    let total = deadline
        .check(source.entity)
        .and_then(|_| query.count(conn).map_err(DbError::from));
    let total = match total {
        Ok(total) => total,
        Err(err) => {
            warn!(entity = source.entity, error = %err, "count failed");
            0
        }
    };

    Page::new(data, paginate, total)
}

/// Every row of `source` matching `filter`, in the source's default order.
fn find_all<T, F>(
    conn: &mut SqliteConnection,
    source: &'static QuerySource,
    filter: &F,
    deadline: Deadline,
) -> Vec<T>
where
    T: DeserializeOwned,
    F: FilterRequest,
{
    let query = SelectQuery::for_request(source, filter);
    load_all(conn, &query, deadline).unwrap_or_else(|err| {
        warn!(entity = source.entity, error = %err, "list read failed, returning nothing");
        Vec::new()
    })
}

/// The single document matching `by`, or [`DbError::NotFound`].
fn find_one<T: DeserializeOwned>(
    conn: &mut SqliteConnection,
    source: &'static QuerySource,
    by: PredicateFragment,
    deadline: Deadline,
) -> Result<T> {
    deadline.check(source.entity)?;
    let doc = SelectQuery::from(source)
        .filter(by)
        .fetch_one_document(conn)?
        .ok_or_else(|| DbError::NotFound(source.entity.to_string()))?;
    materialize_one(source.entity, &doc)
}
