//! Command-line interface.
//!
//! Every subcommand is a thin consumer of [`DataManager`]: it opens the configured
//! store, calls one lifecycle operation and reports the outcome through the
//! message macros.

pub mod export;
pub mod import;
pub mod init;
pub mod migrations;
pub mod record;
pub mod reset;
pub mod stats;
pub mod tools;
pub mod watch;

use crate::libs::config::Config;
use crate::libs::error::DataError;
use crate::libs::manager::{DataManager, ManagerOptions};
use crate::libs::messages::Message;
use crate::libs::store::SqliteStore;
use crate::msg_error_anyhow;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Configuration initialization")]
    Init(init::InitArgs),
    #[command(about = "Show storage statistics")]
    Stats(stats::StatsArgs),
    #[command(about = "List tools that currently hold data")]
    Tools,
    #[command(about = "Export all stored data to a file")]
    Export(export::ExportArgs),
    #[command(about = "Import data from an export file", arg_required_else_help = true)]
    Import(import::ImportArgs),
    #[command(about = "Delete all stored data")]
    Reset(reset::ResetArgs),
    #[command(about = "Read and write individual tool records", arg_required_else_help = true)]
    Record(record::RecordArgs),
    #[command(about = "Keep statistics refreshed and print every update")]
    Watch,
    #[command(about = "Inspect database migrations", arg_required_else_help = true)]
    Migrations(migrations::MigrationsArgs),
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help(true))]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub async fn menu() -> Result<()> {
        let cli = Self::parse();
        match cli.command {
            Commands::Init(args) => init::cmd(args),
            Commands::Stats(args) => stats::cmd(args).await,
            Commands::Tools => tools::cmd().await,
            Commands::Export(args) => export::cmd(args).await,
            Commands::Import(args) => import::cmd(args).await,
            Commands::Reset(args) => reset::cmd(args).await,
            Commands::Record(args) => record::cmd(args).await,
            Commands::Watch => watch::cmd().await,
            Commands::Migrations(args) => migrations::cmd(args),
        }
    }
}

/// Opens the configured store and wraps it in a manager.
pub(crate) fn open_manager() -> Result<DataManager<SqliteStore>> {
    let config = Config::read()?;
    let store = SqliteStore::open().map_err(|e| msg_error_anyhow!(Message::StorageInaccessible(e.to_string())))?;
    Ok(DataManager::new(Arc::new(store), ManagerOptions::from_config(&config)))
}

/// User-facing wording for a failed lifecycle operation.
pub(crate) fn failure_message(err: &DataError, fallback: fn(String) -> Message) -> Message {
    match err {
        DataError::StorageUnavailable(reason) => Message::StorageInaccessible(reason.clone()),
        DataError::UnsupportedMode(mode) => Message::UnsupportedImportMode(mode.to_string()),
        DataError::IncompatibleFormat { expected, found } => {
            Message::IncompatibleBundle(expected.clone(), found.clone().unwrap_or_else(|| "<missing>".to_string()))
        }
        DataError::MalformedBundle(reason) => Message::MalformedBundle(reason.clone()),
        other => fallback(other.to_string()),
    }
}
