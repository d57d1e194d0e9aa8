//! Row-level access to the `records` table.
//!
//! `Records` borrows a connection (or a transaction, which derefs to one), so the
//! same queries serve single calls and multi-statement atomic operations.

use crate::libs::record::{from_millis, Record};
use rusqlite::{params, Connection, OptionalExtension, Result, Row};

const UPSERT_RECORD: &str = "INSERT INTO records (tool_id, key, payload, updated_at) VALUES (?1, ?2, ?3, ?4)
    ON CONFLICT (tool_id, key) DO UPDATE SET payload = excluded.payload, updated_at = excluded.updated_at";
const INSERT_RECORD: &str = "INSERT INTO records (tool_id, key, payload, updated_at) VALUES (?1, ?2, ?3, ?4)";
const SELECT_RECORDS: &str = "SELECT tool_id, key, payload, updated_at FROM records";
const ORDER_BY_ID: &str = "ORDER BY id";
const DELETE_RECORD: &str = "DELETE FROM records WHERE tool_id = ?1 AND key = ?2";
const DELETE_ALL_RECORDS: &str = "DELETE FROM records";
const COUNT_RECORDS: &str = "SELECT COUNT(*) FROM records";
const RECORDS_SIZE: &str = "SELECT COALESCE(SUM(LENGTH(CAST(tool_id AS BLOB)) + LENGTH(CAST(key AS BLOB)) + LENGTH(payload) + 8), 0) FROM records";
const TOOL_TALLIES: &str = "SELECT tool_id, COUNT(*), MAX(updated_at) FROM records GROUP BY tool_id ORDER BY MIN(id)";
const DISTINCT_TOOLS: &str = "SELECT tool_id FROM records GROUP BY tool_id ORDER BY MIN(id)";

/// Which records to fetch.
#[derive(Debug, Clone)]
pub enum RecordFilter {
    All,
    Tool(String),
}

/// Per-tool aggregate as read from the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolTallyRow {
    pub tool_id: String,
    pub item_count: u64,
    pub last_updated_millis: i64,
}

pub struct Records<'a> {
    conn: &'a Connection,
}

impl<'a> Records<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Creates the record or overwrites payload and timestamp of an existing `(tool_id, key)`.
    /// The row keeps its original position in insertion order.
    pub fn upsert(&self, record: &Record) -> Result<()> {
        self.conn.execute(
            UPSERT_RECORD,
            params![record.tool_id, record.key, record.payload, record.updated_at.timestamp_millis()],
        )?;
        Ok(())
    }

    /// Plain insert; fails on a duplicate `(tool_id, key)`.
    pub fn insert(&self, record: &Record) -> Result<()> {
        self.conn.execute(
            INSERT_RECORD,
            params![record.tool_id, record.key, record.payload, record.updated_at.timestamp_millis()],
        )?;
        Ok(())
    }

    pub fn get(&self, tool_id: &str, key: &str) -> Result<Option<Record>> {
        self.conn
            .query_row(&format!("{} WHERE tool_id = ?1 AND key = ?2", SELECT_RECORDS), params![tool_id, key], map_record)
            .optional()
    }

    /// Records in insertion order.
    pub fn fetch(&self, filter: RecordFilter) -> Result<Vec<Record>> {
        let records = match filter {
            RecordFilter::All => {
                let mut stmt = self.conn.prepare(&format!("{} {}", SELECT_RECORDS, ORDER_BY_ID))?;
                let rows = stmt.query_map([], map_record)?;
                rows.collect::<Result<Vec<_>>>()?
            }
            RecordFilter::Tool(tool_id) => {
                let mut stmt = self.conn.prepare(&format!("{} WHERE tool_id = ?1 {}", SELECT_RECORDS, ORDER_BY_ID))?;
                let rows = stmt.query_map(params![tool_id], map_record)?;
                rows.collect::<Result<Vec<_>>>()?
            }
        };

        Ok(records)
    }

    pub fn delete(&self, tool_id: &str, key: &str) -> Result<usize> {
        self.conn.execute(DELETE_RECORD, params![tool_id, key])
    }

    pub fn delete_all(&self) -> Result<usize> {
        self.conn.execute(DELETE_ALL_RECORDS, [])
    }

    pub fn count(&self) -> Result<u64> {
        self.conn.query_row(COUNT_RECORDS, [], |row| row.get(0))
    }

    /// Bytes held by records: identifiers, payload and the timestamp.
    pub fn size_bytes(&self) -> Result<u64> {
        let size: i64 = self.conn.query_row(RECORDS_SIZE, [], |row| row.get(0))?;
        Ok(size.max(0) as u64)
    }

    /// Item count and latest update per tool, ordered by each tool's oldest surviving record.
    pub fn tallies(&self) -> Result<Vec<ToolTallyRow>> {
        let mut stmt = self.conn.prepare(TOOL_TALLIES)?;
        let rows = stmt.query_map([], |row| {
            Ok(ToolTallyRow {
                tool_id: row.get(0)?,
                item_count: row.get(1)?,
                last_updated_millis: row.get(2)?,
            })
        })?;
        rows.collect()
    }

    pub fn distinct_tools(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(DISTINCT_TOOLS)?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        rows.collect()
    }
}

fn map_record(row: &Row) -> Result<Record> {
    let millis: i64 = row.get(3)?;
    Ok(Record {
        tool_id: row.get(0)?,
        key: row.get(1)?,
        payload: row.get(2)?,
        updated_at: from_millis(millis).ok_or(rusqlite::Error::IntegralValueOutOfRange(3, millis))?,
    })
}

