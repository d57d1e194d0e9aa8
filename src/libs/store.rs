//! Store adapter: uniform access to persisted tool data.
//!
//! [`StoreAdapter`] is the seam the rest of the core talks to. [`SqliteStore`]
//! is the production implementation: one SQLite connection behind a mutex, with
//! every call moved onto the blocking pool so the async runtime never waits on
//! disk I/O.
//!
//! ```rust,no_run
//! use toolshed::libs::record::Record;
//! use toolshed::libs::store::{SqliteStore, StoreAdapter};
//!
//! # async fn demo() -> Result<(), toolshed::libs::error::StoreError> {
//! let store = SqliteStore::open_in_memory()?;
//! store.put(Record::new("calc", "last", b"42".to_vec())).await?;
//! assert_eq!(store.storage_stats().await?.total_records, 1);
//! # Ok(())
//! # }
//! ```

use crate::db::db::Db;
use crate::db::history::HistoryRows;
use crate::db::preferences::PreferenceRows;
use crate::db::records::{RecordFilter, Records};
use crate::libs::bundle::ExportOptions;
use crate::libs::error::StoreError;
use crate::libs::record::{from_millis, HistoryEntry, Preferences, Record};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;

/// Size of the store at the moment of the call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StorageStats {
    pub total_records: u64,
    /// Bytes held by records, preferences and history.
    pub estimated_size: u64,
}

/// Item count and latest update for one tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolTally {
    pub tool_id: String,
    pub item_count: u64,
    pub last_updated: DateTime<Utc>,
}

/// One consistent pass over the store: totals plus per-tool tallies in first-observation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageScan {
    pub stats: StorageStats,
    pub tallies: Vec<ToolTally>,
}

/// The full contents of a store. `None` auxiliary trees mean "not read" on the way
/// out and "leave as is" on the way in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreContents {
    pub records: Vec<Record>,
    pub preferences: Option<Preferences>,
    pub history: Option<Vec<HistoryEntry>>,
}

#[async_trait]
pub trait StoreAdapter: Send + Sync + 'static {
    async fn storage_stats(&self) -> Result<StorageStats, StoreError>;

    async fn list_distinct_tools(&self) -> Result<Vec<String>, StoreError>;

    async fn usage_scan(&self) -> Result<UsageScan, StoreError>;

    async fn read_contents(&self, options: ExportOptions) -> Result<StoreContents, StoreError>;

    /// Replaces every record, and each auxiliary tree that is present, in one atomic step.
    /// On failure nothing changes.
    async fn replace_contents(&self, contents: StoreContents) -> Result<(), StoreError>;

    async fn bulk_replace(&self, records: Vec<Record>) -> Result<(), StoreError> {
        self.replace_contents(StoreContents {
            records,
            preferences: None,
            history: None,
        })
        .await
    }

    /// Removes all records, preferences and history. Calling it on an empty store is fine.
    async fn clear_all(&self) -> Result<(), StoreError>;
}

#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    location: String,
}

impl SqliteStore {
    /// Opens the database configured for the current user.
    pub fn open() -> Result<Self, StoreError> {
        let path = crate::db::db::default_db_path().map_err(StoreError::unavailable)?;
        Self::open_at(path)
    }

    pub fn open_at(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let location = path.as_ref().display().to_string();
        let db = Db::open(path).map_err(StoreError::unavailable)?;
        Ok(Self::from_db(db, location))
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let db = Db::in_memory().map_err(StoreError::unavailable)?;
        Ok(Self::from_db(db, ":memory:".to_string()))
    }

    fn from_db(db: Db, location: String) -> Self {
        Self {
            conn: Arc::new(Mutex::new(db.conn)),
            location,
        }
    }

    /// Where the data lives, for display.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Runs `op` on the blocking pool with exclusive access to the connection.
    async fn with_conn<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock();
            op(&mut guard)
        })
        .await
        .map_err(|e| StoreError::Unavailable(format!("storage task failed: {}", e)))?
    }

    /// Creates or overwrites the record at `(tool_id, key)`.
    pub async fn put(&self, record: Record) -> Result<(), StoreError> {
        self.with_conn(move |conn| Records::new(conn).upsert(&record).map_err(StoreError::write)).await
    }

    pub async fn get(&self, tool_id: &str, key: &str) -> Result<Option<Record>, StoreError> {
        let (tool_id, key) = (tool_id.to_string(), key.to_string());
        self.with_conn(move |conn| Records::new(conn).get(&tool_id, &key).map_err(StoreError::read)).await
    }

    /// Returns whether a record was removed.
    pub async fn delete(&self, tool_id: &str, key: &str) -> Result<bool, StoreError> {
        let (tool_id, key) = (tool_id.to_string(), key.to_string());
        self.with_conn(move |conn| {
            let removed = Records::new(conn).delete(&tool_id, &key).map_err(StoreError::write)?;
            Ok(removed > 0)
        })
        .await
    }

    pub async fn list_tool(&self, tool_id: &str) -> Result<Vec<Record>, StoreError> {
        let filter = RecordFilter::Tool(tool_id.to_string());
        self.with_conn(move |conn| Records::new(conn).fetch(filter).map_err(StoreError::read)).await
    }

    pub async fn set_preference(&self, key: &str, value: serde_json::Value) -> Result<(), StoreError> {
        let key = key.to_string();
        self.with_conn(move |conn| PreferenceRows::new(conn).set(&key, &value).map_err(StoreError::write)).await
    }

    pub async fn preference(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        let key = key.to_string();
        self.with_conn(move |conn| PreferenceRows::new(conn).get(&key).map_err(StoreError::read)).await
    }

    pub async fn append_history(&self, entry: HistoryEntry) -> Result<(), StoreError> {
        self.with_conn(move |conn| HistoryRows::new(conn).append(&entry).map_err(StoreError::write)).await
    }

    pub async fn history_for(&self, tool_id: &str) -> Result<Vec<HistoryEntry>, StoreError> {
        let tool_id = tool_id.to_string();
        self.with_conn(move |conn| HistoryRows::new(conn).for_tool(&tool_id).map_err(StoreError::read)).await
    }
}

fn read_stats(conn: &Connection) -> rusqlite::Result<StorageStats> {
    let records = Records::new(conn);
    let total_records = records.count()?;
    let estimated_size = records.size_bytes()? + PreferenceRows::new(conn).size_bytes()? + HistoryRows::new(conn).size_bytes()?;

    Ok(StorageStats {
        total_records,
        estimated_size,
    })
}

#[async_trait]
impl StoreAdapter for SqliteStore {
    async fn storage_stats(&self) -> Result<StorageStats, StoreError> {
        self.with_conn(|conn| read_stats(conn).map_err(StoreError::read)).await
    }

    async fn list_distinct_tools(&self) -> Result<Vec<String>, StoreError> {
        self.with_conn(|conn| Records::new(conn).distinct_tools().map_err(StoreError::read)).await
    }

    async fn usage_scan(&self) -> Result<UsageScan, StoreError> {
        self.with_conn(|conn| {
            let stats = read_stats(conn).map_err(StoreError::read)?;
            let tallies = Records::new(conn)
                .tallies()
                .map_err(StoreError::read)?
                .into_iter()
                .map(|row| {
                    let last_updated = from_millis(row.last_updated_millis)
                        .ok_or_else(|| StoreError::Read(format!("timestamp out of range for tool '{}'", row.tool_id)))?;
                    Ok(ToolTally {
                        tool_id: row.tool_id,
                        item_count: row.item_count,
                        last_updated,
                    })
                })
                .collect::<Result<Vec<_>, StoreError>>()?;

            Ok(UsageScan { stats, tallies })
        })
        .await
    }

    async fn read_contents(&self, options: ExportOptions) -> Result<StoreContents, StoreError> {
        self.with_conn(move |conn| {
            let records = Records::new(conn).fetch(RecordFilter::All).map_err(StoreError::read)?;
            let preferences = if options.include_preferences {
                Some(PreferenceRows::new(conn).all().map_err(StoreError::read)?)
            } else {
                None
            };
            let history = if options.include_history {
                Some(HistoryRows::new(conn).all().map_err(StoreError::read)?)
            } else {
                None
            };

            Ok(StoreContents {
                records,
                preferences,
                history,
            })
        })
        .await
    }

    async fn replace_contents(&self, contents: StoreContents) -> Result<(), StoreError> {
        self.with_conn(move |conn| {
            let tx = conn.transaction().map_err(StoreError::write)?;

            let records = Records::new(&tx);
            records.delete_all().map_err(StoreError::write)?;
            for record in &contents.records {
                records.insert(record).map_err(StoreError::write)?;
            }
            if let Some(preferences) = &contents.preferences {
                PreferenceRows::new(&tx).replace(preferences).map_err(StoreError::write)?;
            }
            if let Some(history) = &contents.history {
                HistoryRows::new(&tx).replace(history).map_err(StoreError::write)?;
            }

            tx.commit().map_err(StoreError::write)
        })
        .await
    }

    async fn clear_all(&self) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            let tx = conn.transaction().map_err(StoreError::write)?;
            Records::new(&tx).delete_all().map_err(StoreError::write)?;
            PreferenceRows::new(&tx).delete_all().map_err(StoreError::write)?;
            HistoryRows::new(&tx).delete_all().map_err(StoreError::write)?;
            tx.commit().map_err(StoreError::write)
        })
        .await
    }
}
