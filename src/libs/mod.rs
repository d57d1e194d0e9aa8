pub mod bundle;
pub mod config;
pub mod data_storage;
pub mod error;
pub mod formatter;
pub mod manager;
pub mod messages;
pub mod record;
pub mod registry;
pub mod scheduler;
pub mod stats;
pub mod store;
pub mod view;
