use crate::db::preferences::parse_json;
use crate::libs::record::{from_millis, HistoryEntry};
use rusqlite::{params, Connection, Result, Row};

const INSERT_ENTRY: &str = "INSERT INTO history (tool_id, entry, recorded_at) VALUES (?1, ?2, ?3)";
const SELECT_ALL_ENTRIES: &str = "SELECT tool_id, entry, recorded_at FROM history ORDER BY id";
const SELECT_TOOL_ENTRIES: &str = "SELECT tool_id, entry, recorded_at FROM history WHERE tool_id = ?1 ORDER BY id";
const DELETE_ALL_ENTRIES: &str = "DELETE FROM history";
const HISTORY_SIZE: &str = "SELECT COALESCE(SUM(LENGTH(CAST(tool_id AS BLOB)) + LENGTH(CAST(entry AS BLOB)) + 8), 0) FROM history";

/// Append-only per-tool history.
pub struct HistoryRows<'a> {
    conn: &'a Connection,
}

impl<'a> HistoryRows<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn append(&self, entry: &HistoryEntry) -> Result<()> {
        self.conn.execute(
            INSERT_ENTRY,
            params![entry.tool_id, entry.entry.to_string(), entry.recorded_at.timestamp_millis()],
        )?;
        Ok(())
    }

    pub fn all(&self) -> Result<Vec<HistoryEntry>> {
        let mut stmt = self.conn.prepare(SELECT_ALL_ENTRIES)?;
        let rows = stmt.query_map([], map_entry)?;
        rows.collect()
    }

    pub fn for_tool(&self, tool_id: &str) -> Result<Vec<HistoryEntry>> {
        let mut stmt = self.conn.prepare(SELECT_TOOL_ENTRIES)?;
        let rows = stmt.query_map(params![tool_id], map_entry)?;
        rows.collect()
    }

    pub fn replace(&self, entries: &[HistoryEntry]) -> Result<()> {
        self.delete_all()?;
        for entry in entries {
            self.append(entry)?;
        }
        Ok(())
    }

    pub fn delete_all(&self) -> Result<usize> {
        self.conn.execute(DELETE_ALL_ENTRIES, [])
    }

    pub fn size_bytes(&self) -> Result<u64> {
        let size: i64 = self.conn.query_row(HISTORY_SIZE, [], |row| row.get(0))?;
        Ok(size.max(0) as u64)
    }
}

fn map_entry(row: &Row) -> Result<HistoryEntry> {
    let text: String = row.get(1)?;
    let millis: i64 = row.get(2)?;
    Ok(HistoryEntry {
        tool_id: row.get(0)?,
        entry: parse_json(1, &text)?,
        recorded_at: from_millis(millis).ok_or(rusqlite::Error::IntegralValueOutOfRange(2, millis))?,
    })
}
