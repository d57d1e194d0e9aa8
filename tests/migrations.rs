#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use std::sync::{Mutex, MutexGuard};
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};
    use toolshed::db::db::Db;
    use toolshed::db::migrations::{get_db_version, needs_migration, MigrationManager};

    // Tests in this file point HOME at their own directory, so they must not overlap.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    struct MigrationTestContext {
        _temp_dir: TempDir,
        _env_guard: MutexGuard<'static, ()>,
    }

    impl TestContext for MigrationTestContext {
        fn setup() -> Self {
            let env_guard = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            let temp_dir = tempfile::tempdir().unwrap();
            std::env::set_var("HOME", temp_dir.path());
            std::env::set_var("LOCALAPPDATA", temp_dir.path());
            MigrationTestContext {
                _temp_dir: temp_dir,
                _env_guard: env_guard,
            }
        }
    }

    fn table_exists(conn: &Connection, name: &str) -> bool {
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1", [name], |row| row.get(0))
            .unwrap();
        count == 1
    }

    #[test_context(MigrationTestContext)]
    #[test]
    fn test_migrations_run_automatically(_ctx: &mut MigrationTestContext) {
        let db = Db::new().unwrap();

        assert_eq!(get_db_version(&db.conn).unwrap(), MigrationManager::new().latest_version());
        assert!(!needs_migration(&db.conn).unwrap());

        for table in ["records", "preferences", "history"] {
            assert!(table_exists(&db.conn, table), "missing table {}", table);
        }
    }

    #[test_context(MigrationTestContext)]
    #[test]
    fn test_fresh_database_needs_migration(_ctx: &mut MigrationTestContext) {
        let conn = Db::new_without_migrations().unwrap();
        assert_eq!(get_db_version(&conn).unwrap(), 0);
        assert!(needs_migration(&conn).unwrap());
    }

    #[test_context(MigrationTestContext)]
    #[test]
    fn test_migration_history(_ctx: &mut MigrationTestContext) {
        let mut conn = Db::new_without_migrations().unwrap();
        let manager = MigrationManager::new();

        manager.run_migrations(&mut conn).unwrap();

        let history = manager.get_migration_history(&conn).unwrap();
        assert_eq!(history.len() as u32, manager.latest_version());
        for (i, (version, _, _)) in history.iter().enumerate() {
            assert_eq!(*version as usize, i + 1);
        }
        assert!(manager.is_migration_applied(&conn, 1).unwrap());
    }

    #[test_context(MigrationTestContext)]
    #[test]
    fn test_migration_idempotency(_ctx: &mut MigrationTestContext) {
        let mut conn = Db::new_without_migrations().unwrap();
        let manager = MigrationManager::new();

        manager.run_migrations(&mut conn).unwrap();
        let version1 = get_db_version(&conn).unwrap();

        manager.run_migrations(&mut conn).unwrap();
        let version2 = get_db_version(&conn).unwrap();

        assert_eq!(version1, version2);
    }

    #[test]
    fn test_in_memory_database_is_migrated() {
        let db = Db::in_memory().unwrap();
        assert!(table_exists(&db.conn, "records"));
        assert!(!needs_migration(&db.conn).unwrap());
    }
}
