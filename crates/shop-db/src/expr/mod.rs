//! Expression types for building SQL conditions.
//!
//! This module contains the building blocks of list filters.

pub mod column;
pub mod ops;

pub use column::Col;
