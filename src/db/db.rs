use crate::db::migrations::init_with_migrations;
use crate::libs::config::Config;
use crate::libs::data_storage::DataStorage;
use anyhow::Result;
use rusqlite::Connection;
use std::path::{Path, PathBuf};

/// An open SQLite connection with the current schema applied.
pub struct Db {
    pub conn: Connection,
}

impl Db {
    /// Opens the database configured for this user, creating it if needed.
    pub fn new() -> Result<Db> {
        Self::open(default_db_path()?)
    }

    /// Opens (or creates) the database at `path` and runs pending migrations.
    pub fn open(path: impl AsRef<Path>) -> Result<Db> {
        let mut conn = Connection::open(path)?;
        configure(&conn)?;
        init_with_migrations(&mut conn)?;

        Ok(Db { conn })
    }

    /// A private in-memory database, mostly for tests and throwaway sessions.
    pub fn in_memory() -> Result<Db> {
        let mut conn = Connection::open_in_memory()?;
        configure(&conn)?;
        init_with_migrations(&mut conn)?;

        Ok(Db { conn })
    }

    /// Opens the default database without touching its schema.
    pub fn new_without_migrations() -> Result<Connection> {
        let conn = Connection::open(default_db_path()?)?;
        configure(&conn)?;
        Ok(conn)
    }
}

/// Resolves the database file from the configuration, falling back to the default name.
pub fn default_db_path() -> Result<PathBuf> {
    let storage = Config::read()?.storage_or_default();
    DataStorage::new().get_path(&storage.db_file_name)
}

fn configure(conn: &Connection) -> Result<()> {
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.busy_timeout(std::time::Duration::from_secs(5))?;
    Ok(())
}
