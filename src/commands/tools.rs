use super::open_manager;
use crate::{
    libs::{messages::Message, registry::ToolRegistry, view::View},
    msg_error_anyhow, msg_info, msg_print,
};
use anyhow::Result;

pub async fn cmd() -> Result<()> {
    let manager = open_manager()?;
    let tools = ToolRegistry::builtin()
        .discover(manager.store().as_ref())
        .await
        .map_err(|e| msg_error_anyhow!(Message::StorageInaccessible(e.to_string())))?;

    if tools.is_empty() {
        msg_info!(Message::NoToolsFound);
        return Ok(());
    }

    msg_print!(Message::ToolsHeader, true);
    View::tools(&tools);
    Ok(())
}
