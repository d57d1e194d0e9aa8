//! # toolshed
//!
//! Local persistence and data lifecycle for a multi-tool productivity app.
//! Every tool (calculators, converters, text utilities, trackers) keeps its state
//! as records in one SQLite store; this crate aggregates that store into usage
//! statistics and provides atomic export, import and reset.
//!
//! - [`libs::store`]: the store adapter and its SQLite implementation
//! - [`libs::stats`] and [`libs::registry`]: statistics snapshots and the tool catalog
//! - [`libs::manager`]: the [`DataManager`](libs::manager::DataManager) façade with
//!   single-flight, scheduled refreshes
//! - [`libs::bundle`]: the versioned export format
//!
//! ```rust,no_run
//! use toolshed::commands::Cli;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Cli::menu().await
//! }
//! ```

pub mod commands;
pub mod db;
pub mod libs;
