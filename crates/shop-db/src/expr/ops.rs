//! SQL expression operators.
//!
//! These structs represent compound expressions like `col = ?`,
//! `LOWER(col) LIKE ?`, `col BETWEEN ? AND ?`. Each implements
//! [`Expression`] and recursively builds SQL fragments.

use crate::{query::value::SqlValue, traits::Expression};

/// Represents a binary comparison (e.g., `=`, `>`, `<=`).
pub struct BinaryOp<L> {
    left: L,
    op: &'static str,
    right: SqlValue,
}

impl<L> BinaryOp<L> {
    pub fn new(left: L, op: &'static str, right: SqlValue) -> Self {
        Self {
            left,
            op,
            right,
        }
    }
}

impl<L: Expression> Expression for BinaryOp<L> {
    fn to_sql(&self, params: &mut Vec<SqlValue>) -> String {
        let left_sql = self.left.to_sql(params);
        params.push(self.right.clone());
        format!("{} {} ?", left_sql, self.op)
    }
}

/// Case-insensitive substring match. The pattern is stored lower-cased and
/// bound as `%pattern%`.
pub struct LikeOp<L> {
    left: L,
    pattern: String,
}

impl<L> LikeOp<L> {
    pub const fn new(left: L, pattern: String) -> Self {
        Self {
            left,
            pattern,
        }
    }
}

impl<L: Expression> Expression for LikeOp<L> {
    fn to_sql(&self, params: &mut Vec<SqlValue>) -> String {
        let left_sql = self.left.to_sql(params);
        params.push(SqlValue::Text(format!("%{}%", self.pattern)));
        format!("LOWER({}) LIKE ?", left_sql)
    }
}

/// Represents an inclusive `BETWEEN ? AND ?` range.
pub struct BetweenOp<L> {
    left: L,
    low: SqlValue,
    high: SqlValue,
}

impl<L> BetweenOp<L> {
    pub fn new(left: L, low: SqlValue, high: SqlValue) -> Self {
        Self {
            left,
            low,
            high,
        }
    }
}

impl<L: Expression> Expression for BetweenOp<L> {
    fn to_sql(&self, params: &mut Vec<SqlValue>) -> String {
        let left_sql = self.left.to_sql(params);
        params.push(self.low.clone());
        params.push(self.high.clone());
        format!("{} BETWEEN ? AND ?", left_sql)
    }
}

/// Applies a single-argument SQL function such as `LOWER` or `date`.
pub struct FuncOp<L> {
    name: &'static str,
    inner: L,
}

impl<L> FuncOp<L> {
    pub const fn new(name: &'static str, inner: L) -> Self {
        Self {
            name,
            inner,
        }
    }
}

impl<L: Expression> Expression for FuncOp<L> {
    fn to_sql(&self, params: &mut Vec<SqlValue>) -> String {
        format!("{}({})", self.name, self.inner.to_sql(params))
    }
}

/// Combines two expressions with `AND` or `OR`.
pub struct LogicalOp<L, R> {
    left: L,
    right: R,
    op: &'static str,
}

impl<L, R> LogicalOp<L, R> {
    pub fn new(left: L, right: R, op: &'static str) -> Self {
        Self {
            left,
            right,
            op,
        }
    }
}

impl<L: Expression, R: Expression> Expression for LogicalOp<L, R> {
    fn to_sql(&self, params: &mut Vec<SqlValue>) -> String {
        let left_sql = self.left.to_sql(params);
        let right_sql = self.right.to_sql(params);
        format!("({} {} {})", left_sql, self.op, right_sql)
    }
}
