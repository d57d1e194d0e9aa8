use super::{failure_message, open_manager};
use crate::{
    libs::{bundle::ImportMode, messages::Message, store::StoreAdapter},
    msg_bail_anyhow, msg_error_anyhow, msg_info, msg_success,
};
use anyhow::Result;
use clap::Args;
use dialoguer::{theme::ColorfulTheme, Confirm};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Bundle file produced by `export` (plain or gzip)
    file: PathBuf,

    /// How the bundle is applied
    #[arg(short, long, value_enum, default_value_t = ImportMode::Replace)]
    mode: ImportMode,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    yes: bool,
}

pub async fn cmd(args: ImportArgs) -> Result<()> {
    let manager = open_manager()?;

    if args.mode == ImportMode::Replace && !args.yes {
        let stored = manager
            .store()
            .storage_stats()
            .await
            .map_err(|e| msg_error_anyhow!(Message::StorageInaccessible(e.to_string())))?
            .total_records;

        if stored > 0 {
            let confirmed = Confirm::with_theme(&ColorfulTheme::default())
                .with_prompt(Message::ConfirmImportReplace(stored as usize).to_string())
                .default(false)
                .interact()?;
            if !confirmed {
                msg_info!(Message::ImportCancelled);
                return Ok(());
            }
        }
    }

    msg_info!(Message::ImportingData(args.file.display().to_string()));
    match manager.import_file(&args.file, args.mode).await {
        Ok(imported) => {
            msg_success!(Message::ImportCompleted(imported));
            Ok(())
        }
        Err(e) => msg_bail_anyhow!(failure_message(&e, Message::ImportFailed)),
    }
}
