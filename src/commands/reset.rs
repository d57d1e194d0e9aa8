use super::{failure_message, open_manager};
use crate::{
    libs::{messages::Message, store::StoreAdapter},
    msg_bail_anyhow, msg_error_anyhow, msg_info, msg_success,
};
use anyhow::Result;
use clap::Args;
use dialoguer::{theme::ColorfulTheme, Confirm};

#[derive(Debug, Args)]
pub struct ResetArgs {
    /// Skip the confirmation prompt
    #[arg(short, long)]
    yes: bool,
}

pub async fn cmd(args: ResetArgs) -> Result<()> {
    let manager = open_manager()?;

    if !args.yes {
        let stored = manager
            .store()
            .storage_stats()
            .await
            .map_err(|e| msg_error_anyhow!(Message::StorageInaccessible(e.to_string())))?
            .total_records;

        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::ConfirmReset(stored).to_string())
            .default(false)
            .interact()?;
        if !confirmed {
            msg_info!(Message::ResetCancelled);
            return Ok(());
        }
    }

    match manager.reset_all().await {
        Ok(()) => {
            msg_success!(Message::ResetCompleted);
            Ok(())
        }
        Err(e) => msg_bail_anyhow!(failure_message(&e, Message::ResetFailed)),
    }
}
