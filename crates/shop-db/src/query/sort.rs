//! Sort and pagination clauses.
//!
//! A caller's sort request is free text. It is resolved against a fixed
//! per-entity whitelist; the resolved key is then bound as a parameter and
//! selects the column through a `CASE` expression, so caller text never
//! reaches the statement.

use tracing::debug;

use crate::{
    models::types::{PaginateReq, SortDirection, SortReq},
    query::value::SqlValue,
};

/// The sortable columns of one entity.
#[derive(Debug)]
pub struct SortWhitelist {
    /// `(key, qualified column)` pairs. Keys are lower-case.
    pub columns: &'static [(&'static str, &'static str)],
    pub default_key: &'static str,
    pub default_direction: SortDirection,
    /// Primary key, appended so equal sort values still have a stable order.
    pub tiebreaker: &'static str,
}

impl SortWhitelist {
    fn member(&self, key: &str) -> Option<&'static str> {
        self.columns
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(k, _)| *k)
    }

    /// Resolves a request, falling back to the defaults for anything that is
    /// not a whitelist member.
    pub fn resolve(&'static self, req: &SortReq) -> OrderClause {
        let requested = req.order_by.trim().to_lowercase();
        let key = match self.member(&requested) {
            Some(key) => key,
            None => {
                if !requested.is_empty() {
                    debug!(requested = %requested, fallback = self.default_key, "unknown sort column");
                }
                self.default_key
            }
        };
        let direction = SortDirection::parse(&req.sort).unwrap_or(self.default_direction);

        OrderClause {
            key,
            direction,
            whitelist: self,
        }
    }
}

/// A resolved ORDER BY clause.
#[derive(Debug, Clone, Copy)]
pub struct OrderClause {
    key: &'static str,
    direction: SortDirection,
    whitelist: &'static SortWhitelist,
}

impl OrderClause {
    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    /// Renders `ORDER BY CASE ? WHEN 'k' THEN col ... END <dir>, <pk> <dir>`
    /// and binds the resolved key.
    pub fn to_sql(&self, params: &mut Vec<SqlValue>) -> String {
        params.push(SqlValue::Text(self.key.to_string()));

        let arms = self
            .whitelist
            .columns
            .iter()
            .map(|(key, column)| format!("WHEN '{}' THEN {}", key, column))
            .collect::<Vec<_>>()
            .join(" ");
        let dir = self.direction.as_sql();

        format!(
            "ORDER BY CASE ? {} END {}, {} {}",
            arms, dir, self.whitelist.tiebreaker, dir
        )
    }
}

/// `LIMIT ? OFFSET ?` for one 1-based page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub limit: i64,
    pub offset: i64,
}

impl PageWindow {
    pub fn single() -> Self {
        Self {
            limit: 1,
            offset: 0,
        }
    }

    pub fn to_sql(&self, params: &mut Vec<SqlValue>) -> String {
        params.push(SqlValue::Integer(self.limit));
        params.push(SqlValue::Integer(self.offset));
        "LIMIT ? OFFSET ?".to_string()
    }
}

impl From<PaginateReq> for PageWindow {
    fn from(req: PaginateReq) -> Self {
        Self {
            limit: req.limit,
            offset: req.offset(),
        }
    }
}
