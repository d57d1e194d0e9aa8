use super::open_manager;
use crate::{
    libs::{messages::Message, registry::ToolRegistry, view::View},
    msg_error_anyhow, msg_info, msg_print,
};
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct StatsArgs {
    /// Print the snapshot as JSON
    #[arg(long)]
    json: bool,
}

pub async fn cmd(args: StatsArgs) -> Result<()> {
    let manager = open_manager()?;
    let snapshot = manager
        .refresh_stats()
        .await
        .ok_or_else(|| msg_error_anyhow!(Message::StatsRefreshFailed("no statistics available".to_string())))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    msg_print!(Message::StatsHeader, true);
    if snapshot.is_empty() {
        msg_info!(Message::StatsEmpty);
    }
    View::snapshot(&snapshot, &ToolRegistry::builtin());

    Ok(())
}
