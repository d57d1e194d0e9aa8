//! Usage statistics derived from the store.

use crate::libs::error::StoreError;
use crate::libs::store::{StoreAdapter, UsageScan};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Quota ceiling shown next to the used size. Display only; going past it is not an error.
pub const STORAGE_QUOTA_BYTES: u64 = 50 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolUsage {
    pub tool_id: String,
    pub item_count: u64,
    pub last_updated: DateTime<Utc>,
}

/// Point-in-time view of the store. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsSnapshot {
    pub total_tools: usize,
    pub total_data_points: u64,
    pub storage_used_bytes: u64,
    pub storage_quota_bytes: u64,
    pub last_activity: Option<DateTime<Utc>>,
    /// Tools in the order they were first observed.
    pub per_tool: Vec<ToolUsage>,
}

impl StatisticsSnapshot {
    /// Snapshot of an empty store.
    pub fn empty(quota_bytes: u64) -> Self {
        Self {
            total_tools: 0,
            total_data_points: 0,
            storage_used_bytes: 0,
            storage_quota_bytes: quota_bytes,
            last_activity: None,
            per_tool: Vec::new(),
        }
    }

    /// Builds a snapshot from one usage scan. Repeated tallies for a tool are folded
    /// into its first position.
    pub fn from_scan(scan: UsageScan, quota_bytes: u64) -> Self {
        let mut per_tool: Vec<ToolUsage> = Vec::with_capacity(scan.tallies.len());

        for tally in scan.tallies {
            match per_tool.iter_mut().find(|usage| usage.tool_id == tally.tool_id) {
                Some(usage) => {
                    usage.item_count += tally.item_count;
                    usage.last_updated = usage.last_updated.max(tally.last_updated);
                }
                None => per_tool.push(ToolUsage {
                    tool_id: tally.tool_id,
                    item_count: tally.item_count,
                    last_updated: tally.last_updated,
                }),
            }
        }

        Self {
            total_tools: per_tool.len(),
            total_data_points: per_tool.iter().map(|usage| usage.item_count).sum(),
            storage_used_bytes: scan.stats.estimated_size,
            storage_quota_bytes: quota_bytes,
            last_activity: per_tool.iter().map(|usage| usage.last_updated).max(),
            per_tool,
        }
    }

    pub fn tool(&self, tool_id: &str) -> Option<&ToolUsage> {
        self.per_tool.iter().find(|usage| usage.tool_id == tool_id)
    }

    /// Used share of the quota; may exceed `1.0`.
    pub fn usage_ratio(&self) -> f64 {
        if self.storage_quota_bytes == 0 {
            return 0.0;
        }
        self.storage_used_bytes as f64 / self.storage_quota_bytes as f64
    }

    pub fn is_empty(&self) -> bool {
        self.total_data_points == 0
    }
}

/// Turns the adapter's raw tallies into a [`StatisticsSnapshot`].
pub struct StatsAggregator<'a, S: StoreAdapter + ?Sized> {
    store: &'a S,
    quota_bytes: u64,
}

impl<'a, S: StoreAdapter + ?Sized> StatsAggregator<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self::with_quota(store, STORAGE_QUOTA_BYTES)
    }

    pub fn with_quota(store: &'a S, quota_bytes: u64) -> Self {
        Self { store, quota_bytes }
    }

    /// Reads the store once and derives the snapshot. Performs no writes.
    pub async fn compute_snapshot(&self) -> Result<StatisticsSnapshot, StoreError> {
        let scan = self.store.usage_scan().await?;
        Ok(StatisticsSnapshot::from_scan(scan, self.quota_bytes))
    }
}
