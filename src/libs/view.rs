use crate::libs::formatter::{format_bytes, format_optional_timestamp, format_payload, format_percent, format_timestamp};
use crate::libs::record::Record;
use crate::libs::registry::{ToolDescriptor, ToolRegistry};
use crate::libs::stats::StatisticsSnapshot;
use prettytable::{row, Table};

const PAYLOAD_PREVIEW_CHARS: usize = 48;

pub struct View {}

impl View {
    pub fn snapshot(snapshot: &StatisticsSnapshot, registry: &ToolRegistry) {
        let mut summary = Table::new();
        summary.add_row(row!["TOOLS", "DATA POINTS", "STORAGE USED", "QUOTA", "USAGE", "LAST ACTIVITY"]);
        summary.add_row(row![
            snapshot.total_tools,
            snapshot.total_data_points,
            format_bytes(snapshot.storage_used_bytes),
            format_bytes(snapshot.storage_quota_bytes),
            format_percent(snapshot.usage_ratio()),
            format_optional_timestamp(snapshot.last_activity.as_ref())
        ]);
        summary.printstd();

        if snapshot.per_tool.is_empty() {
            return;
        }

        let mut table = Table::new();
        table.add_row(row!["TOOL", "NAME", "CATEGORY", "ITEMS", "LAST UPDATED"]);
        for usage in &snapshot.per_tool {
            let descriptor = registry.describe(&usage.tool_id);
            table.add_row(row![
                usage.tool_id,
                descriptor.name,
                descriptor.category,
                usage.item_count,
                format_timestamp(&usage.last_updated)
            ]);
        }
        table.printstd();
    }

    pub fn tools(tools: &[ToolDescriptor]) {
        let mut table = Table::new();

        table.add_row(row!["#", "TOOL", "NAME", "CATEGORY"]);
        for (index, tool) in tools.iter().enumerate() {
            table.add_row(row![index + 1, tool.id, tool.name, tool.category]);
        }
        table.printstd();
    }

    pub fn records(records: &[Record]) {
        let mut table = Table::new();

        table.add_row(row!["KEY", "SIZE", "UPDATED", "PAYLOAD"]);
        for record in records {
            table.add_row(row![
                record.key,
                format_bytes(record.payload.len() as u64),
                format_timestamp(&record.updated_at),
                format_payload(&record.payload, PAYLOAD_PREVIEW_CHARS)
            ]);
        }
        table.printstd();
    }

    pub fn migration_history(history: &[(u32, String, String)]) {
        let mut table = Table::new();

        table.add_row(row!["VERSION", "NAME", "APPLIED AT"]);
        for (version, name, applied_at) in history {
            table.add_row(row![version, name, applied_at]);
        }
        table.printstd();
    }
}
