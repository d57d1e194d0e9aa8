//! Export of all stored data into a single bundle file.
//!
//! Without flags the defaults from the `export` config section apply; the flags
//! can only narrow what is exported (or switch compression on).

use super::{failure_message, open_manager};
use crate::{
    libs::{
        bundle::{ExportBundle, ExportOptions},
        config::Config,
        messages::Message,
    },
    msg_bail_anyhow, msg_info, msg_success,
};
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Output file (default: toolshed_export_YYYYMMDD_HHMMSS.json in the current directory)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Leave tool history out of the bundle
    #[arg(long)]
    no_history: bool,

    /// Leave preferences out of the bundle
    #[arg(long)]
    no_preferences: bool,

    /// Gzip the output file
    #[arg(short, long)]
    compress: bool,
}

pub async fn cmd(args: ExportArgs) -> Result<()> {
    let defaults = Config::read()?.export_or_default();
    let mut options = ExportOptions::from_config(&defaults);
    options.include_history &= !args.no_history;
    options.include_preferences &= !args.no_preferences;
    let compress = args.compress || defaults.compress;

    let path = args.output.unwrap_or_else(|| ExportBundle::default_file_name(compress));
    let manager = open_manager()?;

    msg_info!(Message::ExportingData);
    match manager.export_to_file(&path, options, compress).await {
        Ok(bundle) => {
            msg_success!(Message::ExportCompleted(path.display().to_string()));
            msg_info!(Message::ExportSummary(bundle.records.len(), bundle.tool_count()));
            Ok(())
        }
        Err(e) => msg_bail_anyhow!(failure_message(&e, Message::ExportFailed)),
    }
}
