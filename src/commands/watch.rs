//! Foreground watch: keeps statistics refreshed until Ctrl-C.

use super::open_manager;
use crate::{
    libs::{
        formatter::{format_bytes, format_optional_timestamp},
        messages::Message,
    },
    msg_error, msg_info, msg_print,
};
use anyhow::Result;

pub async fn cmd() -> Result<()> {
    let manager = open_manager()?;
    let mut updates = manager.subscribe();

    manager.start();
    msg_info!(Message::WatchStarted);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            signal = &mut ctrl_c => {
                match signal {
                    Ok(()) => msg_info!(Message::WatchReceivedCtrlC),
                    Err(e) => msg_error!(Message::WatchCtrlCListenFailed(e.to_string())),
                }
                break;
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                if let Some(snapshot) = snapshot {
                    msg_print!(Message::StorageUsage(
                        format_bytes(snapshot.storage_used_bytes),
                        format_bytes(snapshot.storage_quota_bytes),
                        snapshot.usage_ratio() * 100.0
                    ));
                    msg_print!(Message::LastActivity(format_optional_timestamp(snapshot.last_activity.as_ref())));
                }
            }
        }
    }

    manager.shutdown();
    Ok(())
}
