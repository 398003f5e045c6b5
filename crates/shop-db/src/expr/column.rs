//! Represents a typed, alias-qualified database column.
//!
//! `Col<T>` ties a qualified column name (`p.title`) to a Rust type `T`. It
//! implements [`Expression`], so it can be used directly in filters.

use std::marker::PhantomData;

use crate::{query::value::SqlValue, traits::Expression};

/// A typed reference to a database column.
///
/// # Example
///
/// ```rust
/// use shop_db::expr::Col;
/// const TITLE: Col<String> = Col::new("p.title");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Col<T> {
    pub name: &'static str,
    _type: PhantomData<T>,
}

impl<T> Col<T> {
    /// Creates a new column reference.
    ///
    /// # Parameters
    ///
    /// - `name`: the column as it appears in a statement, qualified with the
    ///   table alias (e.g., `"o.created_at"`)
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _type: PhantomData,
        }
    }
}

impl<T> Expression for Col<T> {
    fn to_sql(&self, _params: &mut Vec<SqlValue>) -> String {
        self.name.to_string()
    }
}
