//! SQLite persistence.
//!
//! [`db::Db`] opens a connection and applies [`migrations`]. The table modules
//! ([`records`], [`preferences`], [`history`]) borrow a connection or transaction,
//! so the store can combine them inside one atomic operation.

pub mod db;
pub mod history;
pub mod migrations;
pub mod preferences;
pub mod records;
