//! Direct access to tool records, the way a tool component reads and writes them.

use super::open_manager;
use crate::{
    libs::{messages::Message, record::Record, view::View},
    msg_error_anyhow, msg_info, msg_print, msg_success, msg_warning,
};
use anyhow::Result;
use clap::{Args, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct RecordArgs {
    #[command(subcommand)]
    command: RecordCommand,
}

#[derive(Debug, Subcommand)]
enum RecordCommand {
    /// Create or overwrite a record
    Put {
        tool: String,
        key: String,
        /// Payload text
        #[arg(required_unless_present = "file", conflicts_with = "file")]
        value: Option<String>,
        /// Read the payload from a file instead
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Print a record's payload
    Get { tool: String, key: String },
    /// Delete a record
    Delete { tool: String, key: String },
    /// List the records of a tool
    List { tool: String },
}

pub async fn cmd(args: RecordArgs) -> Result<()> {
    let manager = open_manager()?;
    let store = manager.store();
    let storage_error = |e: crate::libs::error::StoreError| msg_error_anyhow!(Message::StorageInaccessible(e.to_string()));

    match args.command {
        RecordCommand::Put { tool, key, value, file } => {
            let payload = match (value, file) {
                (_, Some(path)) => tokio::fs::read(&path).await?,
                (Some(value), None) => value.into_bytes(),
                (None, None) => Vec::new(),
            };
            store.put(Record::new(tool.clone(), key.clone(), payload)).await.map_err(storage_error)?;
            msg_success!(Message::RecordSaved(tool, key));
        }
        RecordCommand::Get { tool, key } => match store.get(&tool, &key).await.map_err(storage_error)? {
            Some(record) => println!("{}", String::from_utf8_lossy(&record.payload)),
            None => msg_warning!(Message::RecordNotFound(tool, key)),
        },
        RecordCommand::Delete { tool, key } => {
            if store.delete(&tool, &key).await.map_err(storage_error)? {
                msg_success!(Message::RecordDeleted(tool, key));
            } else {
                msg_warning!(Message::RecordNotFound(tool, key));
            }
        }
        RecordCommand::List { tool } => {
            let records = store.list_tool(&tool).await.map_err(storage_error)?;
            if records.is_empty() {
                msg_info!(Message::NoRecordsForTool(tool));
            } else {
                msg_print!(Message::RecordsHeader(tool), true);
                View::records(&records);
            }
        }
    }

    Ok(())
}
