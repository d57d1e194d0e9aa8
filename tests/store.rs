mod common;

#[cfg(test)]
mod tests {
    use crate::common::at;
    use serde_json::json;
    use tempfile::TempDir;
    use test_context::{test_context, AsyncTestContext};
    use toolshed::libs::bundle::ExportOptions;
    use toolshed::libs::error::StoreError;
    use toolshed::libs::record::{HistoryEntry, Record};
    use toolshed::libs::store::{SqliteStore, StoreAdapter, StoreContents};

    struct StoreTestContext {
        temp_dir: TempDir,
        store: SqliteStore,
    }

    impl AsyncTestContext for StoreTestContext {
        async fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let store = SqliteStore::open_at(temp_dir.path().join("toolshed.db")).unwrap();
            StoreTestContext { temp_dir, store }
        }
    }

    async fn seed(store: &SqliteStore) {
        store.put(Record::at("calc", "a", b"1".to_vec(), at(1))).await.unwrap();
        store.put(Record::at("calc", "b", b"2".to_vec(), at(2))).await.unwrap();
        store.put(Record::at("notes", "a", b"text".to_vec(), at(3))).await.unwrap();
    }

    #[test]
    fn test_unopenable_storage_is_unavailable() {
        let temp_dir = tempfile::tempdir().unwrap();
        let blocker = temp_dir.path().join("not-a-directory");
        std::fs::write(&blocker, b"file").unwrap();

        let result = SqliteStore::open_at(blocker.join("toolshed.db"));
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
    }

    #[test_context(StoreTestContext)]
    #[tokio::test]
    async fn test_storage_stats_reflect_current_state(ctx: &mut StoreTestContext) {
        let empty = ctx.store.storage_stats().await.unwrap();
        assert_eq!(empty.total_records, 0);
        assert_eq!(empty.estimated_size, 0);

        seed(&ctx.store).await;
        let stats = ctx.store.storage_stats().await.unwrap();
        assert_eq!(stats.total_records, 3);
        assert!(stats.estimated_size > 0);

        ctx.store.set_preference("theme", json!("dark")).await.unwrap();
        let with_preferences = ctx.store.storage_stats().await.unwrap();
        assert_eq!(with_preferences.total_records, 3);
        assert!(with_preferences.estimated_size > stats.estimated_size);
    }

    #[test_context(StoreTestContext)]
    #[tokio::test]
    async fn test_list_distinct_tools(ctx: &mut StoreTestContext) {
        assert!(ctx.store.list_distinct_tools().await.unwrap().is_empty());

        seed(&ctx.store).await;
        assert_eq!(ctx.store.list_distinct_tools().await.unwrap(), vec!["calc", "notes"]);

        // A tool exists only while it has records.
        ctx.store.delete("notes", "a").await.unwrap();
        assert_eq!(ctx.store.list_distinct_tools().await.unwrap(), vec!["calc"]);
    }

    #[test_context(StoreTestContext)]
    #[tokio::test]
    async fn test_bulk_replace_swaps_entire_record_set(ctx: &mut StoreTestContext) {
        seed(&ctx.store).await;

        let replacement = vec![
            Record::at("pomodoro", "session", b"25".to_vec(), at(100)),
            Record::at("calc", "z", b"9".to_vec(), at(101)),
        ];
        ctx.store.bulk_replace(replacement.clone()).await.unwrap();

        let contents = ctx.store.read_contents(ExportOptions::records_only()).await.unwrap();
        assert_eq!(contents.records, replacement);
        assert!(ctx.store.get("calc", "a").await.unwrap().is_none());
    }

    #[test_context(StoreTestContext)]
    #[tokio::test]
    async fn test_failed_bulk_replace_keeps_prior_state(ctx: &mut StoreTestContext) {
        seed(&ctx.store).await;
        let before = ctx.store.read_contents(ExportOptions::default()).await.unwrap();

        // The duplicate key makes the second insert fail after the old rows are gone.
        let conflicting = vec![
            Record::at("calc", "dup", b"1".to_vec(), at(50)),
            Record::at("calc", "dup", b"2".to_vec(), at(51)),
        ];
        let result = ctx.store.bulk_replace(conflicting).await;
        assert!(matches!(result, Err(StoreError::Write(_))));

        let after = ctx.store.read_contents(ExportOptions::default()).await.unwrap();
        assert_eq!(after, before);
    }

    #[test_context(StoreTestContext)]
    #[tokio::test]
    async fn test_readers_never_see_half_replaced_records(ctx: &mut StoreTestContext) {
        seed(&ctx.store).await;
        let replacement: Vec<Record> = (0..50)
            .map(|i| Record::at("timer", format!("lap-{}", i), b"1".to_vec(), at(i)))
            .collect();

        let reader = async {
            let mut seen = Vec::new();
            for _ in 0..20 {
                seen.push(ctx.store.storage_stats().await.unwrap().total_records);
                tokio::task::yield_now().await;
            }
            seen
        };
        let (replaced, seen) = tokio::join!(ctx.store.bulk_replace(replacement), reader);
        replaced.unwrap();

        for total in seen {
            assert!(total == 3 || total == 50, "observed a partial record set of {}", total);
        }
        assert_eq!(ctx.store.storage_stats().await.unwrap().total_records, 50);
    }

    #[test_context(StoreTestContext)]
    #[tokio::test]
    async fn test_replace_contents_leaves_absent_trees(ctx: &mut StoreTestContext) {
        ctx.store.set_preference("theme", json!("dark")).await.unwrap();
        ctx.store.append_history(HistoryEntry::new("calc", json!({ "expr": "1+1" }))).await.unwrap();

        ctx.store
            .replace_contents(StoreContents {
                records: vec![Record::at("calc", "a", b"1".to_vec(), at(1))],
                preferences: Some(Default::default()),
                history: None,
            })
            .await
            .unwrap();

        let contents = ctx.store.read_contents(ExportOptions::default()).await.unwrap();
        assert_eq!(contents.records.len(), 1);
        assert_eq!(contents.preferences, Some(Default::default()));
        assert_eq!(contents.history.map(|h| h.len()), Some(1));
    }

    #[test_context(StoreTestContext)]
    #[tokio::test]
    async fn test_clear_all_is_idempotent(ctx: &mut StoreTestContext) {
        seed(&ctx.store).await;
        ctx.store.set_preference("theme", json!("dark")).await.unwrap();
        ctx.store.append_history(HistoryEntry::new("calc", json!(1))).await.unwrap();

        ctx.store.clear_all().await.unwrap();
        let first = ctx.store.read_contents(ExportOptions::default()).await.unwrap();

        ctx.store.clear_all().await.unwrap();
        let second = ctx.store.read_contents(ExportOptions::default()).await.unwrap();

        assert_eq!(first, second);
        assert!(second.records.is_empty());
        assert_eq!(second.preferences, Some(Default::default()));
        assert_eq!(second.history, Some(Vec::new()));
        assert_eq!(ctx.store.storage_stats().await.unwrap().estimated_size, 0);
    }

    #[test_context(StoreTestContext)]
    #[tokio::test]
    async fn test_data_survives_reopen(ctx: &mut StoreTestContext) {
        seed(&ctx.store).await;

        let reopened = SqliteStore::open_at(ctx.temp_dir.path().join("toolshed.db")).unwrap();
        assert_eq!(reopened.storage_stats().await.unwrap().total_records, 3);
        assert_eq!(reopened.get("notes", "a").await.unwrap().unwrap().updated_at, at(3));
    }
}
