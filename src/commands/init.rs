//! Interactive setup: writes `config.json` and creates the database.

use crate::{
    libs::{config::Config, messages::Message, store::SqliteStore},
    msg_error_anyhow, msg_info, msg_success,
};
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Remove the existing configuration instead of creating a new one
    #[arg(short, long)]
    delete: bool,
}

pub fn cmd(init_args: InitArgs) -> Result<()> {
    if init_args.delete {
        Config::delete()?;
        msg_success!(Message::ConfigDeleted);
        return Ok(());
    }

    Config::init()?.save()?;
    msg_success!(Message::ConfigSaved);

    // Opening runs the migrations, so the database is ready before the first tool writes to it.
    let store = SqliteStore::open().map_err(|e| msg_error_anyhow!(Message::StorageInaccessible(e.to_string())))?;
    msg_info!(Message::StorageOpened(store.location().to_string()));
    Ok(())
}
