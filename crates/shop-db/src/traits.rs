//! Core trait that powers predicate assembly.
//!
//! [`Expression`] is implemented by table columns ([`crate::expr::Col`]) and by
//! the compound operators in [`crate::expr::ops`]. Rendering an expression
//! appends its bound values to a parameter list and returns a SQL fragment
//! that uses bare `?` markers; placeholder numbering happens later, once, when
//! the whole statement is rendered.

use crate::{
    expr::ops::{BetweenOp, BinaryOp, FuncOp, LikeOp, LogicalOp},
    query::value::SqlValue,
};

/// A trait for types that can be converted into SQL expressions.
pub trait Expression: Sized {
    /// Converts this expression into a SQL string fragment and appends bound parameters.
    ///
    /// # Parameters
    ///
    /// - `params`: the value list; one entry is pushed per `?` marker, in
    ///   the order the markers appear in the returned fragment.
    ///
    /// # Example
    ///
    /// ```rust
    /// use shop_db::expr::Col;
    /// use shop_db::traits::Expression as _;
    ///
    /// let col = Col::<String>::new("p.title");
    /// let mut params = vec![];
    /// let sql = col.eq("Coffee").to_sql(&mut params); // "p.title = ?"
    /// assert_eq!(params.len(), 1);
    /// ```
    fn to_sql(&self, params: &mut Vec<SqlValue>) -> String;

    /// Creates a SQL `=` condition.
    fn eq<T: Into<SqlValue>>(self, value: T) -> BinaryOp<Self> {
        BinaryOp::new(self, "=", value.into())
    }

    /// Creates a case-insensitive substring match: `LOWER(x) LIKE ?` bound
    /// to `%term%` with the term lower-cased.
    fn ilike(self, term: &str) -> LikeOp<Self> {
        LikeOp::new(self, term.to_lowercase())
    }

    /// Creates a SQL `BETWEEN ? AND ?` condition.
    fn between<T: Into<SqlValue>>(self, low: T, high: T) -> BetweenOp<Self> {
        BetweenOp::new(self, low.into(), high.into())
    }

    /// Wraps the expression in `LOWER(..)`.
    fn lower(self) -> FuncOp<Self> {
        FuncOp::new("LOWER", self)
    }

    /// Wraps the expression in `date(..)`.
    fn date(self) -> FuncOp<Self> {
        FuncOp::new("date", self)
    }

    /// Combines two expressions with `OR`.
    fn or<E: Expression>(self, other: E) -> LogicalOp<Self, E> {
        LogicalOp::new(self, other, "OR")
    }
}
