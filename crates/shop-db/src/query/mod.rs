//! The query builder.
//!
//! List and lookup statements are assembled from three parts:
//!
//! - [`filter`]: turns a filter request into ordered [`PredicateFragment`]s,
//!   each carrying its own bound values.
//! - [`sort`]: resolves a free-text sort request against a per-entity
//!   whitelist and renders the page window.
//! - [`select`]: joins fragments, ORDER BY and window into a row statement
//!   and a matching count statement.
//!
//! Fragments use bare `?` markers. Numbering to `?1..?N` happens once, in
//! [`Statement::render`], which also checks that every marker has a value.

pub mod filter;
pub mod fragment;
pub mod placeholder;
pub mod select;
pub mod sort;
pub mod source;
pub mod statement;
pub mod value;

pub use filter::FilterRequest;
pub use fragment::PredicateFragment;
pub use select::SelectQuery;
pub use sort::{OrderClause, PageWindow, SortWhitelist};
pub use source::{QuerySource, CATEGORIES, ORDERS, PRODUCTS};
pub use statement::Statement;
pub use value::SqlValue;
