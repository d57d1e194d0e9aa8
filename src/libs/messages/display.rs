//! Display implementation for toolshed messages.
//!
//! All user-facing text is defined here, in one match, so call sites only
//! choose a [`Message`] variant and its parameters.

use super::types::Message;
use std::fmt::{Display, Formatter, Result};

impl Display for Message {
    fn fmt(&self, f: &mut Formatter) -> Result {
        let text = match self {
            // === STORAGE MESSAGES ===
            Message::StorageInaccessible(error) => format!("Storage inaccessible: {}", error),
            Message::StorageOpened(path) => format!("Using data store at {}", path),
            Message::DataStoragePathError => "Failed to resolve the data storage directory".to_string(),

            // === STATISTICS MESSAGES ===
            Message::StatsHeader => "Stored data overview".to_string(),
            Message::StatsEmpty => "No tool has stored any data yet".to_string(),
            Message::StatsRefreshFailed(error) => format!("Statistics refresh failed, keeping last known snapshot: {}", error),
            Message::StatsRefreshJoined => "Statistics refresh already running, waiting for its result".to_string(),
            Message::StatsRefreshStarted(generation) => format!("Statistics refresh started (generation {})", generation),
            Message::StatsRefreshCompleted(tools, points) => format!("Statistics refreshed: {} tools, {} data points", tools, points),
            Message::StatsInvalidated => "Cached statistics invalidated".to_string(),
            Message::StorageUsage(used, quota, percent) => format!("Storage used: {} of {} ({:.1}%)", used, quota, percent),
            Message::LastActivity(when) => format!("Last activity: {}", when),
            Message::ToolsHeader => "Tools holding data".to_string(),
            Message::NoToolsFound => "No tools found".to_string(),

            // === EXPORT MESSAGES ===
            Message::ExportingData => "Exporting all stored data...".to_string(),
            Message::ExportCompleted(path) => format!("Export completed: {}", path),
            Message::ExportFailed(error) => format!("Export failed: {}", error),
            Message::ExportSummary(records, tools) => format!("Exported {} records from {} tools", records, tools),

            // === IMPORT MESSAGES ===
            Message::ImportingData(path) => format!("Importing data from {}", path),
            Message::ImportCompleted(records) => format!("Import completed: {} records restored", records),
            Message::ImportFailed(error) => format!("Import failed: {}", error),
            Message::ImportCancelled => "Import cancelled".to_string(),
            Message::ConfirmImportReplace(records) => {
                format!("Replace all {} stored records with the contents of the bundle?", records)
            }
            Message::UnsupportedImportMode(mode) => format!("Import mode '{}' is not supported yet", mode),
            Message::IncompatibleBundle(expected, found) => {
                format!("Incompatible export file: expected format version {}, found {}", expected, found)
            }
            Message::MalformedBundle(error) => format!("The file is not a valid export bundle: {}", error),

            // === RESET MESSAGES ===
            Message::ConfirmReset(records) => format!("Delete all {} records, preferences and history? This cannot be undone", records),
            Message::ResetCompleted => "All stored data has been deleted".to_string(),
            Message::ResetCancelled => "Reset cancelled".to_string(),
            Message::ResetFailed(error) => format!("Reset failed: {}", error),

            // === RECORD MESSAGES ===
            Message::RecordSaved(tool, key) => format!("Saved {}/{}", tool, key),
            Message::RecordDeleted(tool, key) => format!("Deleted {}/{}", tool, key),
            Message::RecordNotFound(tool, key) => format!("No record {}/{}", tool, key),
            Message::RecordsHeader(tool) => format!("Records of '{}'", tool),
            Message::NoRecordsForTool(tool) => format!("Tool '{}' has no records", tool),

            // === SCHEDULER MESSAGES ===
            Message::SchedulerStarted(interval, debounce) => {
                format!("Statistics refresh scheduled every {}ms (debounce {}ms)", interval, debounce)
            }
            Message::SchedulerStopped => "Statistics refresh stopped".to_string(),
            Message::SchedulerAlreadyRunning => "Statistics refresh is already scheduled".to_string(),
            Message::WatchStarted => "Watching stored data, press Ctrl-C to stop".to_string(),
            Message::WatchReceivedCtrlC => "Received Ctrl-C, shutting down".to_string(),
            Message::WatchCtrlCListenFailed(error) => format!("Failed to listen for Ctrl-C: {}", error),

            // === CONFIGURATION MESSAGES ===
            Message::ConfigSaved => "Configuration saved successfully".to_string(),
            Message::ConfigDeleted => "Configuration removed".to_string(),
            Message::ConfigModuleStorage => "Storage settings".to_string(),
            Message::ConfigModuleRefresh => "Statistics refresh settings".to_string(),
            Message::ConfigModuleExport => "Export defaults".to_string(),
            Message::PromptSelectModules => "Select settings to configure".to_string(),
            Message::PromptDbFileName => "Database file name".to_string(),
            Message::PromptQuotaMegabytes => "Storage quota shown in statistics (MiB)".to_string(),
            Message::PromptRefreshInterval => "Refresh interval (seconds)".to_string(),
            Message::PromptDebounceMillis => "Refresh delay after changes (milliseconds)".to_string(),
            Message::PromptIncludeHistory => "Include history in exports?".to_string(),
            Message::PromptIncludePreferences => "Include preferences in exports?".to_string(),
            Message::PromptCompressExports => "Compress export files?".to_string(),

            // === MIGRATION MESSAGES ===
            Message::MigrationsFound(count) => format!("Found {} pending database migrations", count),
            Message::RunningMigration(version, name) => format!("Running migration v{}: {}", version, name),
            Message::MigrationCompleted(version) => format!("✓ Migration v{} completed", version),
            Message::MigrationFailed(version, error) => format!("✗ Migration v{} failed: {}", version, error),
            Message::AllMigrationsCompleted => "All database migrations completed successfully".to_string(),
            Message::DatabaseVersion(version) => format!("Current database version: {}", version),
            Message::DatabaseUpToDate => "Database schema is up to date".to_string(),
            Message::DatabaseNeedsUpdate => "Database schema needs to be updated".to_string(),
            Message::MigrationHistory => "Migration history:".to_string(),
        };

        write!(f, "{}", text)
    }
}
