pub mod catalog;
pub mod order;
pub mod types;
pub mod user;
