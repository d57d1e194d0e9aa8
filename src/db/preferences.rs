use crate::libs::record::Preferences;
use rusqlite::{params, Connection, OptionalExtension, Result};

const UPSERT_PREFERENCE: &str = "INSERT INTO preferences (key, value) VALUES (?1, ?2)
    ON CONFLICT (key) DO UPDATE SET value = excluded.value";
const SELECT_PREFERENCE: &str = "SELECT value FROM preferences WHERE key = ?1";
const SELECT_ALL_PREFERENCES: &str = "SELECT key, value FROM preferences ORDER BY key";
const DELETE_ALL_PREFERENCES: &str = "DELETE FROM preferences";
const PREFERENCES_SIZE: &str = "SELECT COALESCE(SUM(LENGTH(CAST(key AS BLOB)) + LENGTH(CAST(value AS BLOB))), 0) FROM preferences";

/// Application-wide preferences stored as JSON text.
pub struct PreferenceRows<'a> {
    conn: &'a Connection,
}

impl<'a> PreferenceRows<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn set(&self, key: &str, value: &serde_json::Value) -> Result<()> {
        self.conn.execute(UPSERT_PREFERENCE, params![key, value.to_string()])?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<Option<serde_json::Value>> {
        let raw: Option<String> = self.conn.query_row(SELECT_PREFERENCE, params![key], |row| row.get(0)).optional()?;
        raw.map(|text| parse_json(0, &text)).transpose()
    }

    pub fn all(&self) -> Result<Preferences> {
        let mut stmt = self.conn.prepare(SELECT_ALL_PREFERENCES)?;
        let rows = stmt.query_map([], |row| {
            let key: String = row.get(0)?;
            let text: String = row.get(1)?;
            Ok((key, parse_json(1, &text)?))
        })?;
        rows.collect()
    }

    /// Swaps the whole preference set for `preferences`.
    pub fn replace(&self, preferences: &Preferences) -> Result<()> {
        self.delete_all()?;
        for (key, value) in preferences {
            self.set(key, value)?;
        }
        Ok(())
    }

    pub fn delete_all(&self) -> Result<usize> {
        self.conn.execute(DELETE_ALL_PREFERENCES, [])
    }

    pub fn size_bytes(&self) -> Result<u64> {
        let size: i64 = self.conn.query_row(PREFERENCES_SIZE, [], |row| row.get(0))?;
        Ok(size.max(0) as u64)
    }
}

pub(crate) fn parse_json(column: usize, text: &str) -> Result<serde_json::Value> {
    serde_json::from_str(text).map_err(|e| rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(e)))
}
