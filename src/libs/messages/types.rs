/// Every user-facing message the application can print.
///
/// Text lives in `display.rs`; call sites only pick a variant and its
/// parameters.
#[derive(Debug, Clone)]
pub enum Message {
    // === STORAGE MESSAGES ===
    StorageInaccessible(String),
    StorageOpened(String), // path
    DataStoragePathError,

    // === STATISTICS MESSAGES ===
    StatsHeader,
    StatsEmpty,
    StatsRefreshFailed(String),  // error
    StatsRefreshJoined,          // joined an in-flight refresh
    StatsRefreshStarted(u64),    // generation
    StatsRefreshCompleted(usize, u64), // tools, data points
    StatsInvalidated,
    StorageUsage(String, String, f64), // used, quota, percent
    LastActivity(String),
    ToolsHeader,
    NoToolsFound,

    // === EXPORT MESSAGES ===
    ExportingData,
    ExportCompleted(String),   // path
    ExportFailed(String),      // error
    ExportSummary(usize, usize), // records, tools

    // === IMPORT MESSAGES ===
    ImportingData(String),         // path
    ImportCompleted(usize),        // records
    ImportFailed(String),          // error
    ImportCancelled,
    ConfirmImportReplace(usize),   // records currently stored
    UnsupportedImportMode(String), // mode
    IncompatibleBundle(String, String), // expected, found
    MalformedBundle(String),

    // === RESET MESSAGES ===
    ConfirmReset(u64), // records
    ResetCompleted,
    ResetCancelled,
    ResetFailed(String),

    // === RECORD MESSAGES ===
    RecordSaved(String, String),   // tool, key
    RecordDeleted(String, String), // tool, key
    RecordNotFound(String, String),
    RecordsHeader(String), // tool
    NoRecordsForTool(String),

    // === SCHEDULER MESSAGES ===
    SchedulerStarted(u64, u64), // interval millis, debounce millis
    SchedulerStopped,
    SchedulerAlreadyRunning,
    WatchStarted,
    WatchReceivedCtrlC,
    WatchCtrlCListenFailed(String),

    // === CONFIGURATION MESSAGES ===
    ConfigSaved,
    ConfigDeleted,
    ConfigModuleStorage,
    ConfigModuleRefresh,
    ConfigModuleExport,
    PromptSelectModules,
    PromptDbFileName,
    PromptQuotaMegabytes,
    PromptRefreshInterval,
    PromptDebounceMillis,
    PromptIncludeHistory,
    PromptIncludePreferences,
    PromptCompressExports,

    // === MIGRATION MESSAGES ===
    MigrationsFound(usize),        // count
    RunningMigration(u32, String), // version, name
    MigrationCompleted(u32),       // version
    MigrationFailed(u32, String),  // version, error
    AllMigrationsCompleted,
    DatabaseVersion(u32),
    DatabaseUpToDate,
    DatabaseNeedsUpdate,
    MigrationHistory,
}
